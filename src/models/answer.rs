//! Answer model: content, acceptance flag, edit history, and comments.

use serde::{Deserialize, Serialize};

use super::UserSummary;

/// An answer to a question.
///
/// At most one answer per question carries `is_accepted = true`, and that
/// answer's id always equals the owning question's `accepted_answer_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub question_id: String,
    pub content: String,
    pub author: UserSummary,
    pub is_accepted: bool,
    pub is_edited: bool,
    pub vote_count: i64,
    #[serde(default)]
    pub edit_history: Vec<AnswerEdit>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: String,
    pub updated_at: String,
}

/// A prior content snapshot, appended whenever an answer is edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEdit {
    pub content: String,
    pub edited_by: String,
    pub edited_at: String,
}

/// A comment on an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author: UserSummary,
    pub created_at: String,
}

/// Request body for posting a new answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    pub question_id: String,
    pub content: String,
}

/// Request body for editing an answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnswerRequest {
    pub content: String,
}

/// Request body for commenting on an answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
}
