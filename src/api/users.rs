//! User API endpoints: profiles, authored content, stats, search.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use super::{success, ApiResult, PageQuery, Pagination};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{Answer, Question, UpdateProfileRequest, User, UserStats};
use crate::AppState;

/// Paginated list of a user's questions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuestionsResponse {
    pub questions: Vec<Question>,
    pub pagination: Pagination,
}

/// Paginated list of a user's answers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswersResponse {
    pub answers: Vec<Answer>,
    pub pagination: Pagination,
}

/// Paginated user search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResponse {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// A user profile together with recomputed statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub user: User,
    pub stats: UserStats,
}

/// GET /api/users/:id - Public profile.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state
        .repo
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    success(user)
}

/// PUT /api/users/me - Update the caller's own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<User> {
    let user = state.repo.update_profile(&caller.user_id, &request).await?;
    success(user)
}

/// GET /api/users/:id/questions - Questions authored by a user.
pub async fn get_user_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageQuery>,
) -> ApiResult<UserQuestionsResponse> {
    let (page, limit) = params.clamped();
    let (questions, total) = state.repo.list_user_questions(&id, page, limit).await?;

    success(UserQuestionsResponse {
        questions,
        pagination: Pagination::new(page, limit, total),
    })
}

/// GET /api/users/:id/answers - Answers authored by a user.
pub async fn get_user_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageQuery>,
) -> ApiResult<UserAnswersResponse> {
    let (page, limit) = params.clamped();
    let (answers, total) = state.repo.list_user_answers(&id, page, limit).await?;

    success(UserAnswersResponse {
        answers,
        pagination: Pagination::new(page, limit, total),
    })
}

/// GET /api/users/:id/stats - Profile with statistics recomputed from source
/// rows (the denormalized counters are for cheap listing reads only).
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<UserStatsResponse> {
    let user = state
        .repo
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    let stats = state.repo.user_stats(&id).await?;

    success(UserStatsResponse { user, stats })
}

/// GET /api/users/search/:query - Username/bio substring search.
pub async fn search_users(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<PageQuery>,
) -> ApiResult<UserSearchResponse> {
    let (page, limit) = params.clamped();
    let (users, total) = state.repo.search_users(&query, page, limit).await?;

    success(UserSearchResponse {
        users,
        pagination: Pagination::new(page, limit, total),
    })
}

/// GET /api/users/top/contributors - Leaderboard by reputation.
pub async fn top_contributors(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Vec<User>> {
    // PageQuery's default limit matches the leaderboard default.
    let (_, limit) = params.clamped();
    let users = state.repo.top_contributors(limit).await?;
    success(users)
}
