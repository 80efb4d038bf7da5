//! User models: public profile, embedded author summary, and profile updates.

use serde::{Deserialize, Serialize};

/// A registered user's public profile. The password hash never leaves the
/// database layer and is not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub reputation: i64,
    /// Denormalized counter, maintained opportunistically on question create/delete.
    pub questions_count: i64,
    /// Denormalized counter, maintained opportunistically on answer create/delete.
    pub answers_count: i64,
    pub badges: Vec<String>,
    pub created_at: String,
}

/// Compact author reference embedded in questions, answers, and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub reputation: i64,
}

/// Request body for updating the caller's own profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Aggregate statistics for a user profile page, recomputed from source rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_questions: i64,
    pub total_answers: i64,
    pub accepted_answers: i64,
    pub total_votes: i64,
    pub total_views: i64,
    pub reputation: i64,
    pub badges: Vec<String>,
}
