//! Question model and request types.

use serde::{Deserialize, Serialize};

use super::{Answer, UserSummary};

/// A question posted by a user.
///
/// `vote_count` and `answer_count` are derived at read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author: UserSummary,
    /// Source of truth for acceptance: the single answer the author accepted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_answer_id: Option<String>,
    pub views: i64,
    pub vote_count: i64,
    pub answer_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A question together with its answers, as served by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// Request body for posting a new question.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Request body for editing an existing question. All fields optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
