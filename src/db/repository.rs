//! Database repository for all persistence operations.
//!
//! Uses prepared statements and transactions for data integrity. Vote counts
//! and answer counts are derived with aggregate subqueries, never stored.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Answer, AnswerEdit, Comment, CreateAnswerRequest, CreateQuestionRequest, Question,
    UpdateProfileRequest, UpdateQuestionRequest, User, UserStats, UserSummary, VoteDirection,
    VoteEntity,
};

/// Sort keys accepted by the question listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSort {
    CreatedAt,
    Views,
    VoteCount,
}

impl QuestionSort {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(QuestionSort::CreatedAt),
            "views" => Some(QuestionSort::Views),
            "voteCount" => Some(QuestionSort::VoteCount),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            QuestionSort::CreatedAt => "q.created_at",
            QuestionSort::Views => "q.views",
            QuestionSort::VoteCount => "vote_count",
        }
    }
}

/// Columns selected for every question row, including the joined author and
/// the derived vote and answer counts.
const QUESTION_SELECT: &str = r#"
    SELECT q.id, q.title, q.content, q.tags, q.accepted_answer_id, q.views,
           q.created_at, q.updated_at,
           u.id AS author_id, u.username AS author_username,
           u.avatar AS author_avatar, u.reputation AS author_reputation,
           COALESCE((SELECT SUM(v.direction) FROM votes v
                     WHERE v.entity_kind = 'question' AND v.entity_id = q.id), 0) AS vote_count,
           (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) AS answer_count
    FROM questions q
    JOIN users u ON u.id = q.author_id
"#;

/// Columns selected for every answer row, including the joined author and the
/// derived vote count.
const ANSWER_SELECT: &str = r#"
    SELECT a.id, a.question_id, a.content, a.is_accepted, a.is_edited,
           a.created_at, a.updated_at,
           u.id AS author_id, u.username AS author_username,
           u.avatar AS author_avatar, u.reputation AS author_reputation,
           COALESCE((SELECT SUM(v.direction) FROM votes v
                     WHERE v.entity_kind = 'answer' AND v.entity_id = a.id), 0) AS vote_count
    FROM answers a
    JOIN users u ON u.id = a.author_id
"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a new user with a pre-hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let taken = sqlx::query("SELECT 1 FROM users WHERE username = ? OR email = ?")
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Validation(
                "Username or email already in use".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO users (id, username, email, password_hash, reputation,
                                  questions_count, answers_count, badges, created_at)
               VALUES (?, ?, ?, ?, 0, 0, 0, '[]', ?)"#,
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            bio: None,
            avatar: None,
            reputation: 0,
            questions_count: 0,
            answers_count: 0,
            badges: Vec::new(),
            created_at: now,
        })
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, username, email, bio, avatar, reputation,
                      questions_count, answers_count, badges, created_at
               FROM users WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Look up a user by email together with the stored password hash.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, username, email, bio, avatar, reputation,
                      questions_count, answers_count, badges, created_at, password_hash
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|r| (user_from_row(r), r.get("password_hash"))))
    }

    /// Update the caller's own profile fields.
    pub async fn update_profile(
        &self,
        id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let bio = request.bio.clone().or(existing.bio.clone());
        let avatar = request.avatar.clone().or(existing.avatar.clone());

        sqlx::query("UPDATE users SET bio = ?, avatar = ? WHERE id = ?")
            .bind(&bio)
            .bind(&avatar)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(User {
            bio,
            avatar,
            ..existing
        })
    }

    /// Search users by username or bio substring, ordered by reputation.
    pub async fn search_users(
        &self,
        query: &str,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        let pattern = format!("%{}%", query);

        let rows = sqlx::query(
            r#"SELECT id, username, email, bio, avatar, reputation,
                      questions_count, answers_count, badges, created_at
               FROM users
               WHERE username LIKE ? OR bio LIKE ?
               ORDER BY reputation DESC, username ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query("SELECT COUNT(*) AS total FROM users WHERE username LIKE ? OR bio LIKE ?")
                .bind(&pattern)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?
                .get("total");

        Ok((rows.iter().map(user_from_row).collect(), total))
    }

    /// Top contributors by reputation, then by activity counters.
    pub async fn top_contributors(&self, limit: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, username, email, bio, avatar, reputation,
                      questions_count, answers_count, badges, created_at
               FROM users
               ORDER BY reputation DESC, questions_count DESC, answers_count DESC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Aggregate profile statistics, recomputed from source rows rather than
    /// the denormalized counters.
    pub async fn user_stats(&self, id: &str) -> Result<UserStats, AppError> {
        let user = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let row = sqlx::query(
            r#"SELECT
                 (SELECT COUNT(*) FROM questions WHERE author_id = ?1) AS total_questions,
                 (SELECT COUNT(*) FROM answers WHERE author_id = ?1) AS total_answers,
                 (SELECT COUNT(*) FROM answers WHERE author_id = ?1 AND is_accepted = 1) AS accepted_answers,
                 COALESCE((SELECT SUM(v.direction) FROM votes v
                           WHERE (v.entity_kind = 'question' AND v.entity_id IN
                                    (SELECT id FROM questions WHERE author_id = ?1))
                              OR (v.entity_kind = 'answer' AND v.entity_id IN
                                    (SELECT id FROM answers WHERE author_id = ?1))), 0) AS total_votes,
                 COALESCE((SELECT SUM(views) FROM questions WHERE author_id = ?1), 0) AS total_views"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            total_questions: row.get("total_questions"),
            total_answers: row.get("total_answers"),
            accepted_answers: row.get("accepted_answers"),
            total_votes: row.get("total_votes"),
            total_views: row.get("total_views"),
            reputation: user.reputation,
            badges: user.badges,
        })
    }

    // ==================== QUESTION OPERATIONS ====================

    /// List questions with pagination, optional tag filter, and sort order.
    pub async fn list_questions(
        &self,
        page: i64,
        limit: i64,
        sort: QuestionSort,
        ascending: bool,
        tag: Option<&str>,
    ) -> Result<(Vec<Question>, i64), AppError> {
        // Tags are stored as a JSON array string; match the quoted element.
        let tag_pattern = tag.map(|t| format!("%\"{}\"%", t.to_lowercase()));

        let order = if ascending { "ASC" } else { "DESC" };
        let filter = if tag_pattern.is_some() {
            "WHERE q.tags LIKE ?"
        } else {
            ""
        };

        let sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            QUESTION_SELECT,
            filter,
            sort.as_sql(),
            order
        );

        let mut query = sqlx::query(&sql);
        if let Some(pattern) = &tag_pattern {
            query = query.bind(pattern);
        }
        let rows = query
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = if tag_pattern.is_some() {
            "SELECT COUNT(*) AS total FROM questions q WHERE q.tags LIKE ?"
        } else {
            "SELECT COUNT(*) AS total FROM questions q"
        };
        let mut count_query = sqlx::query(count_sql);
        if let Some(pattern) = &tag_pattern {
            count_query = count_query.bind(pattern);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("total");

        Ok((rows.iter().map(question_from_row).collect(), total))
    }

    /// Get a question by ID.
    pub async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let sql = format!("{} WHERE q.id = ?", QUESTION_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(question_from_row))
    }

    /// Atomically increment a question's view counter.
    pub async fn increment_views(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE questions SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }

    /// Create a new question and bump the author's question counter.
    pub async fn create_question(
        &self,
        author_id: &str,
        request: &CreateQuestionRequest,
    ) -> Result<Question, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let tags = normalize_tags(&request.tags);
        let tags_json = serde_json::to_string(&tags)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO questions (id, title, content, tags, author_id, views, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, 0, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&tags_json)
        .bind(author_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET questions_count = questions_count + 1 WHERE id = ?")
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_question(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Question vanished after insert".to_string()))
    }

    /// Update a question. Only the author may edit.
    pub async fn update_question(
        &self,
        id: &str,
        requester_id: &str,
        request: &UpdateQuestionRequest,
    ) -> Result<Question, AppError> {
        let existing = self
            .get_question(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

        if existing.author.id != requester_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let title = request.title.as_ref().unwrap_or(&existing.title);
        let content = request.content.as_ref().unwrap_or(&existing.content);
        let tags = request
            .tags
            .as_ref()
            .map(|t| normalize_tags(t))
            .unwrap_or(existing.tags.clone());
        let tags_json = serde_json::to_string(&tags)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE questions SET title = ?, content = ?, tags = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(&tags_json)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_question(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))
    }

    /// Delete a question with its answers, comments, and votes. Only the
    /// author may delete; the author's question counter is decremented.
    pub async fn delete_question(&self, id: &str, requester_id: &str) -> Result<(), AppError> {
        let existing = self
            .get_question(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

        if existing.author.id != requester_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"DELETE FROM votes
               WHERE (entity_kind = 'question' AND entity_id = ?1)
                  OR (entity_kind = 'answer' AND entity_id IN
                        (SELECT id FROM answers WHERE question_id = ?1))"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Answers, edits, and comments cascade via foreign keys.
        sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET questions_count = questions_count - 1 WHERE id = ?")
            .bind(requester_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Questions authored by a user, newest first.
    pub async fn list_user_questions(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Question>, i64), AppError> {
        let sql = format!(
            "{} WHERE q.author_id = ? ORDER BY q.created_at DESC LIMIT ? OFFSET ?",
            QUESTION_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 =
            sqlx::query("SELECT COUNT(*) AS total FROM questions WHERE author_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
                .get("total");

        Ok((rows.iter().map(question_from_row).collect(), total))
    }

    // ==================== ANSWER OPERATIONS ====================

    /// Answers for a question, best-voted first, oldest first on ties.
    pub async fn list_answers(&self, question_id: &str) -> Result<Vec<Answer>, AppError> {
        let sql = format!(
            "{} WHERE a.question_id = ? ORDER BY vote_count DESC, a.created_at ASC",
            ANSWER_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(question_id)
            .fetch_all(&self.pool)
            .await?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in &rows {
            answers.push(self.hydrate_answer(row).await?);
        }
        Ok(answers)
    }

    /// Get an answer by ID with its comments and edit history.
    pub async fn get_answer(&self, id: &str) -> Result<Option<Answer>, AppError> {
        let sql = format!("{} WHERE a.id = ?", ANSWER_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_answer(&row).await?)),
            None => Ok(None),
        }
    }

    /// Answers authored by a user, newest first.
    pub async fn list_user_answers(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Answer>, i64), AppError> {
        let sql = format!(
            "{} WHERE a.author_id = ? ORDER BY a.created_at DESC LIMIT ? OFFSET ?",
            ANSWER_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in &rows {
            answers.push(self.hydrate_answer(row).await?);
        }

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM answers WHERE author_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        Ok((answers, total))
    }

    /// Create a new answer and bump the author's answer counter.
    pub async fn create_answer(
        &self,
        author_id: &str,
        request: &CreateAnswerRequest,
    ) -> Result<Answer, AppError> {
        let question = sqlx::query("SELECT 1 FROM questions WHERE id = ?")
            .bind(&request.question_id)
            .fetch_optional(&self.pool)
            .await?;
        if question.is_none() {
            return Err(AppError::NotFound(format!(
                "Question {} not found",
                request.question_id
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO answers (id, question_id, author_id, content, is_accepted, is_edited,
                                    created_at, updated_at)
               VALUES (?, ?, ?, ?, 0, 0, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.question_id)
        .bind(author_id)
        .bind(&request.content)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET answers_count = answers_count + 1 WHERE id = ?")
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_answer(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Answer vanished after insert".to_string()))
    }

    /// Edit an answer, snapshotting the prior content into the edit history.
    /// Only the author may edit.
    pub async fn update_answer(
        &self,
        id: &str,
        requester_id: &str,
        content: &str,
    ) -> Result<Answer, AppError> {
        let existing = self
            .get_answer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", id)))?;

        if existing.author.id != requester_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO answer_edits (answer_id, content, edited_by, edited_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&existing.content)
        .bind(requester_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE answers SET content = ?, is_edited = 1, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_answer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", id)))
    }

    /// Delete an answer. Only the author may delete. If the answer was the
    /// accepted one, the owning question's acceptance pointer is cleared in
    /// the same transaction.
    pub async fn delete_answer(&self, id: &str, requester_id: &str) -> Result<(), AppError> {
        let existing = self
            .get_answer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", id)))?;

        if existing.author.id != requester_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        if existing.is_accepted {
            sqlx::query("UPDATE questions SET accepted_answer_id = NULL WHERE id = ?")
                .bind(&existing.question_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM votes WHERE entity_kind = 'answer' AND entity_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM answers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET answers_count = answers_count - 1 WHERE id = ?")
            .bind(requester_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Append a comment to an answer and return the updated answer.
    pub async fn add_comment(
        &self,
        answer_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Answer, AppError> {
        let exists = sqlx::query("SELECT 1 FROM answers WHERE id = ?")
            .bind(answer_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Answer {} not found", answer_id)));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO comments (id, answer_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(answer_id)
        .bind(author_id)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_answer(answer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", answer_id)))
    }

    // ==================== ACCEPTANCE COORDINATOR ====================

    /// Accept an answer on behalf of the question's author.
    ///
    /// The whole hand-off runs in one transaction: un-flag the previously
    /// accepted answer, flag the target, and move the question's
    /// `accepted_answer_id` pointer. The pointer is the source of truth, and
    /// the transaction keeps the flag and the pointer in lock-step, so no
    /// interleaving can leave two answers flagged.
    pub async fn accept_answer(
        &self,
        answer_id: &str,
        requester_id: &str,
    ) -> Result<Answer, AppError> {
        let mut tx = self.pool.begin().await?;

        let answer_row = sqlx::query("SELECT question_id FROM answers WHERE id = ?")
            .bind(answer_id)
            .fetch_optional(&mut *tx)
            .await?;
        let question_id: String = match answer_row {
            Some(row) => row.get("question_id"),
            None => {
                return Err(AppError::NotFound(format!(
                    "Answer {} not found",
                    answer_id
                )))
            }
        };

        let question_row =
            sqlx::query("SELECT author_id, accepted_answer_id FROM questions WHERE id = ?")
                .bind(&question_id)
                .fetch_optional(&mut *tx)
                .await?;
        let question_row = question_row.ok_or_else(|| {
            AppError::NotFound(format!("Question {} not found", question_id))
        })?;

        let author_id: String = question_row.get("author_id");
        if author_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the question author can accept answers".to_string(),
            ));
        }

        let currently_accepted: Option<String> = question_row.get("accepted_answer_id");
        if currently_accepted.as_deref() == Some(answer_id) {
            // Accepting the already-accepted answer is a no-op.
            tx.commit().await?;
            return self
                .get_answer(answer_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", answer_id)));
        }

        sqlx::query("UPDATE answers SET is_accepted = 0 WHERE question_id = ? AND is_accepted = 1")
            .bind(&question_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE answers SET is_accepted = 1 WHERE id = ?")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE questions SET accepted_answer_id = ? WHERE id = ?")
            .bind(answer_id)
            .bind(&question_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_answer(answer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {} not found", answer_id)))
    }

    // ==================== VOTE LEDGER ====================

    /// Record a directional vote on a question or answer, returning the
    /// derived vote count.
    ///
    /// Semantics: voting the direction the user already holds retracts the
    /// vote; voting the opposite direction switches it. Both paths are
    /// conditional writes inside one transaction -- a guarded DELETE whose
    /// `rows_affected` decides between toggle-off and upsert -- so concurrent
    /// casts from different users on the same entity both land.
    pub async fn cast_vote(
        &self,
        entity: VoteEntity,
        entity_id: &str,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<i64, AppError> {
        let exists_sql = match entity {
            VoteEntity::Question => "SELECT 1 FROM questions WHERE id = ?",
            VoteEntity::Answer => "SELECT 1 FROM answers WHERE id = ?",
        };
        let exists = sqlx::query(exists_sql)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!(
                "{} {} not found",
                capitalize(entity.as_str()),
                entity_id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"DELETE FROM votes
               WHERE entity_kind = ? AND entity_id = ? AND user_id = ? AND direction = ?"#,
        )
        .bind(entity.as_str())
        .bind(entity_id)
        .bind(user_id)
        .bind(direction.as_i64())
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() == 0 {
            // First vote or a direction switch; the conflict target is the
            // (kind, entity, user) primary key, so an opposite vote is
            // overwritten rather than duplicated.
            sqlx::query(
                r#"INSERT INTO votes (entity_kind, entity_id, user_id, direction, created_at)
                   VALUES (?, ?, ?, ?, ?)
                   ON CONFLICT(entity_kind, entity_id, user_id)
                   DO UPDATE SET direction = excluded.direction, created_at = excluded.created_at"#,
            )
            .bind(entity.as_str())
            .bind(entity_id)
            .bind(user_id)
            .bind(direction.as_i64())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        let count: i64 = sqlx::query(
            "SELECT COALESCE(SUM(direction), 0) AS vote_count FROM votes WHERE entity_kind = ? AND entity_id = ?",
        )
        .bind(entity.as_str())
        .bind(entity_id)
        .fetch_one(&mut *tx)
        .await?
        .get("vote_count");

        tx.commit().await?;
        Ok(count)
    }

    // ==================== DASHBOARD STATS ====================

    /// Number of questions per tag, most-used first.
    pub async fn tag_stats(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query(
            r#"SELECT je.value AS tag, COUNT(*) AS count
               FROM questions q, json_each(q.tags) je
               GROUP BY je.value
               ORDER BY count DESC, tag ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("tag"), row.get("count")))
            .collect())
    }

    /// Number of questions per calendar day, oldest first.
    pub async fn activity_stats(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query(
            r#"SELECT substr(created_at, 1, 10) AS date, COUNT(*) AS count
               FROM questions
               GROUP BY date
               ORDER BY date ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("date"), row.get("count")))
            .collect())
    }

    // ==================== HELPERS ====================

    /// Attach comments and edit history to an answer row.
    async fn hydrate_answer(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Answer, AppError> {
        let mut answer = answer_from_row(row);

        let comment_rows = sqlx::query(
            r#"SELECT c.id, c.content, c.created_at,
                      u.id AS author_id, u.username AS author_username,
                      u.avatar AS author_avatar, u.reputation AS author_reputation
               FROM comments c
               JOIN users u ON u.id = c.author_id
               WHERE c.answer_id = ?
               ORDER BY c.created_at ASC"#,
        )
        .bind(&answer.id)
        .fetch_all(&self.pool)
        .await?;

        answer.comments = comment_rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                content: row.get("content"),
                author: author_from_row(row),
                created_at: row.get("created_at"),
            })
            .collect();

        let edit_rows = sqlx::query(
            r#"SELECT content, edited_by, edited_at
               FROM answer_edits WHERE answer_id = ?
               ORDER BY edited_at ASC, id ASC"#,
        )
        .bind(&answer.id)
        .fetch_all(&self.pool)
        .await?;

        answer.edit_history = edit_rows
            .iter()
            .map(|row| AnswerEdit {
                content: row.get("content"),
                edited_by: row.get("edited_by"),
                edited_at: row.get("edited_at"),
            })
            .collect();

        Ok(answer)
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let badges_str: String = row.get("badges");
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        reputation: row.get("reputation"),
        questions_count: row.get("questions_count"),
        answers_count: row.get("answers_count"),
        badges: parse_json_array(&badges_str),
        created_at: row.get("created_at"),
    }
}

fn author_from_row(row: &sqlx::sqlite::SqliteRow) -> UserSummary {
    UserSummary {
        id: row.get("author_id"),
        username: row.get("author_username"),
        avatar: row.get("author_avatar"),
        reputation: row.get("author_reputation"),
    }
}

fn question_from_row(row: &sqlx::sqlite::SqliteRow) -> Question {
    let tags_str: String = row.get("tags");
    Question {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: parse_json_array(&tags_str),
        author: author_from_row(row),
        accepted_answer_id: row.get("accepted_answer_id"),
        views: row.get("views"),
        vote_count: row.get("vote_count"),
        answer_count: row.get("answer_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn answer_from_row(row: &sqlx::sqlite::SqliteRow) -> Answer {
    let is_accepted: i64 = row.get("is_accepted");
    let is_edited: i64 = row.get("is_edited");
    Answer {
        id: row.get("id"),
        question_id: row.get("question_id"),
        content: row.get("content"),
        author: author_from_row(row),
        is_accepted: is_accepted != 0,
        is_edited: is_edited != 0,
        vote_count: row.get("vote_count"),
        edit_history: Vec::new(),
        comments: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
