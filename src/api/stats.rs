//! Dashboard statistics endpoints.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::AppState;

/// Questions per tag, for the dashboard bar chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStat {
    pub tag: String,
    pub count: i64,
}

/// Questions per day, for the dashboard activity chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStat {
    pub date: String,
    pub count: i64,
}

/// GET /api/stats/tags - Question counts per tag.
pub async fn tag_stats(State(state): State<AppState>) -> ApiResult<Vec<TagStat>> {
    let stats = state
        .repo
        .tag_stats()
        .await?
        .into_iter()
        .map(|(tag, count)| TagStat { tag, count })
        .collect();

    success(stats)
}

/// GET /api/stats/activity - Question counts per calendar day.
pub async fn activity_stats(State(state): State<AppState>) -> ApiResult<Vec<ActivityStat>> {
    let stats = state
        .repo
        .activity_stats()
        .await?
        .into_iter()
        .map(|(date, count)| ActivityStat { date, count })
        .collect();

    success(stats)
}
