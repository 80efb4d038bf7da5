//! Question API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, Pagination, MAX_PAGE_LIMIT};
use crate::auth::AuthUser;
use crate::db::QuestionSort;
use crate::errors::AppError;
use crate::models::{
    CreateQuestionRequest, Question, QuestionDetail, UpdateQuestionRequest, VoteCount,
    VoteEntity, VoteRequest,
};
use crate::AppState;

/// Content length bounds shared by questions and answers.
pub const MIN_TITLE_LENGTH: usize = 10;
pub const MAX_TITLE_LENGTH: usize = 300;
pub const MIN_CONTENT_LENGTH: usize = 20;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MIN_TAGS: usize = 1;
pub const MAX_TAGS: usize = 5;

/// Query parameters for the question listing.
#[derive(Debug, Deserialize)]
pub struct ListQuestionsQuery {
    #[serde(default = "super::default_page")]
    pub page: i64,
    #[serde(default = "super::default_page_limit")]
    pub limit: i64,
    /// Sort key: createdAt (default), views, or voteCount.
    #[serde(default)]
    pub sort: Option<String>,
    /// "asc" or "desc" (default).
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Paginated question listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListResponse {
    pub questions: Vec<Question>,
    pub pagination: Pagination,
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let len = title.trim().chars().count();
    if !(MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&len) {
        return Err(AppError::Validation(format!(
            "Title must be between {} and {} characters",
            MIN_TITLE_LENGTH, MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

pub(super) fn validate_content(content: &str) -> Result<(), AppError> {
    let len = content.trim().chars().count();
    if !(MIN_CONTENT_LENGTH..=MAX_CONTENT_LENGTH).contains(&len) {
        return Err(AppError::Validation(format!(
            "Content must be between {} and {} characters",
            MIN_CONTENT_LENGTH, MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    let non_empty = tags.iter().filter(|t| !t.trim().is_empty()).count();
    if !(MIN_TAGS..=MAX_TAGS).contains(&non_empty) {
        return Err(AppError::Validation(format!(
            "Must provide {}-{} tags",
            MIN_TAGS, MAX_TAGS
        )));
    }
    Ok(())
}

/// GET /api/questions - Paginated, filterable question listing.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsQuery>,
) -> ApiResult<QuestionListResponse> {
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let sort = match params.sort.as_deref() {
        None => QuestionSort::CreatedAt,
        Some(key) => QuestionSort::from_str(key).ok_or_else(|| {
            AppError::Validation(format!("Unknown sort key: {}", key))
        })?,
    };
    let ascending = params.order.as_deref() == Some("asc");

    let (questions, total) = state
        .repo
        .list_questions(page, limit, sort, ascending, params.tag.as_deref())
        .await?;

    success(QuestionListResponse {
        questions,
        pagination: Pagination::new(page, limit, total),
    })
}

/// GET /api/questions/:id - Question detail with answers. Increments views.
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<QuestionDetail> {
    state.repo.increment_views(&id).await?;

    let question = state
        .repo
        .get_question(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;
    let answers = state.repo.list_answers(&id).await?;

    success(QuestionDetail { question, answers })
}

/// POST /api/questions - Post a new question.
pub async fn create_question(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateQuestionRequest>,
) -> ApiResult<Question> {
    validate_title(&request.title)?;
    validate_content(&request.content)?;
    validate_tags(&request.tags)?;

    let question = state.repo.create_question(&caller.user_id, &request).await?;

    if let Err(e) = state.search.index_question(&question).await {
        tracing::warn!("Failed to index question: {}", e);
    }

    success(question)
}

/// PUT /api/questions/:id - Edit a question (author only).
pub async fn update_question(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuestionRequest>,
) -> ApiResult<Question> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    if let Some(content) = &request.content {
        validate_content(content)?;
    }
    if let Some(tags) = &request.tags {
        validate_tags(tags)?;
    }

    let question = state
        .repo
        .update_question(&id, &caller.user_id, &request)
        .await?;

    if let Err(e) = state.search.index_question(&question).await {
        tracing::warn!("Failed to re-index question: {}", e);
    }

    success(question)
}

/// DELETE /api/questions/:id - Delete a question (author only).
pub async fn delete_question(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_question(&id, &caller.user_id).await?;

    if let Err(e) = state.search.remove_question(&id).await {
        tracing::warn!("Failed to remove question from index: {}", e);
    }

    success(())
}

/// POST /api/questions/:id/vote - Cast, switch, or retract a vote.
pub async fn vote_question(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<VoteCount> {
    let vote_count = state
        .repo
        .cast_vote(VoteEntity::Question, &id, &caller.user_id, request.vote_type)
        .await?;

    success(VoteCount { vote_count })
}
