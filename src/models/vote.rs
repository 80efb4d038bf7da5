//! Vote ledger types.
//!
//! A vote is a single mapping from (entity, user) to a direction. Mutual
//! exclusion between upvote and downvote is structural: one row per user per
//! entity, keyed in the database on the (kind, entity, user) triple.

use serde::{Deserialize, Serialize};

/// The kind of entity a vote targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteEntity {
    Question,
    Answer,
}

impl VoteEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteEntity::Question => "question",
            VoteEntity::Answer => "answer",
        }
    }
}

/// Directional preference a user holds on a votable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    #[serde(rename = "upvote")]
    Up,
    #[serde(rename = "downvote")]
    Down,
}

impl VoteDirection {
    /// Storage encoding: +1 for up, -1 for down. Vote counts are derived by
    /// summing this column, so the count always equals |up| - |down|.
    pub fn as_i64(&self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// Request body for `POST /questions/{id}/vote` and `POST /answers/{id}/vote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: VoteDirection,
}

/// Response payload carrying the derived vote count after a cast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount {
    pub vote_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_direction_wire_names() {
        let up: VoteDirection = serde_json::from_str("\"upvote\"").unwrap();
        assert_eq!(up, VoteDirection::Up);
        let down: VoteDirection = serde_json::from_str("\"downvote\"").unwrap();
        assert_eq!(down, VoteDirection::Down);
        assert!(serde_json::from_str::<VoteDirection>("\"sideways\"").is_err());
    }

    #[test]
    fn test_direction_encoding() {
        assert_eq!(VoteDirection::Up.as_i64(), 1);
        assert_eq!(VoteDirection::Down.as_i64(), -1);
    }
}
