//! Answer API endpoints, including voting, acceptance, and comments.

use axum::{
    extract::{Path, State},
    Json,
};

use super::questions::validate_content;
use super::{success, ApiResult};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    Answer, CreateAnswerRequest, CreateCommentRequest, UpdateAnswerRequest, VoteCount,
    VoteEntity, VoteRequest,
};
use crate::AppState;

/// Comment length bounds.
const MIN_COMMENT_LENGTH: usize = 1;
const MAX_COMMENT_LENGTH: usize = 500;

/// GET /api/questions/:id/answers - Answers for a question, best-voted first.
pub async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> ApiResult<Vec<Answer>> {
    let exists = state.repo.get_question(&question_id).await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Question {} not found",
            question_id
        )));
    }

    let answers = state.repo.list_answers(&question_id).await?;
    success(answers)
}

/// POST /api/answers - Post a new answer.
pub async fn create_answer(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateAnswerRequest>,
) -> ApiResult<Answer> {
    if request.question_id.trim().is_empty() {
        return Err(AppError::Validation("Question ID is required".to_string()));
    }
    validate_content(&request.content)?;

    let answer = state.repo.create_answer(&caller.user_id, &request).await?;
    success(answer)
}

/// PUT /api/answers/:id - Edit an answer (author only). The prior content is
/// snapshotted into the edit history.
pub async fn update_answer(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateAnswerRequest>,
) -> ApiResult<Answer> {
    validate_content(&request.content)?;

    let answer = state
        .repo
        .update_answer(&id, &caller.user_id, &request.content)
        .await?;
    success(answer)
}

/// DELETE /api/answers/:id - Delete an answer (author only).
pub async fn delete_answer(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_answer(&id, &caller.user_id).await?;
    success(())
}

/// POST /api/answers/:id/vote - Cast, switch, or retract a vote.
pub async fn vote_answer(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<VoteCount> {
    let vote_count = state
        .repo
        .cast_vote(VoteEntity::Answer, &id, &caller.user_id, request.vote_type)
        .await?;

    success(VoteCount { vote_count })
}

/// POST /api/answers/:id/accept - Accept an answer (question author only).
pub async fn accept_answer(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Answer> {
    let answer = state.repo.accept_answer(&id, &caller.user_id).await?;
    success(answer)
}

/// POST /api/answers/:id/comments - Comment on an answer.
pub async fn add_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Answer> {
    let len = request.content.trim().chars().count();
    if !(MIN_COMMENT_LENGTH..=MAX_COMMENT_LENGTH).contains(&len) {
        return Err(AppError::Validation(format!(
            "Comment must be between {} and {} characters",
            MIN_COMMENT_LENGTH, MAX_COMMENT_LENGTH
        )));
    }

    let answer = state
        .repo
        .add_comment(&id, &caller.user_id, request.content.trim())
        .await?;
    success(answer)
}
