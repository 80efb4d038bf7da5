//! Integration tests for the Q&A backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::search::SearchIndex;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Initialize search index
        let search = Arc::new(SearchIndex::open(&index_path).expect("Failed to init search"));

        // Create config
        let config = Config {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expiry_hours: 24,
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return (token, user_id).
    async fn register(&self, username: &str) -> (String, String) {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "hunter2hunter2"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "registration should succeed");

        let body: Value = resp.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
        (token, user_id)
    }

    /// Post a question and return its id.
    async fn post_question(&self, token: &str, title: &str, tags: &[&str]) -> String {
        let resp = self
            .client
            .post(self.url("/api/questions"))
            .bearer_auth(token)
            .json(&json!({
                "title": title,
                "content": "This is a sufficiently long question body for validation.",
                "tags": tags
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "question creation should succeed");

        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Post an answer and return its id.
    async fn post_answer(&self, token: &str, question_id: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/answers"))
            .bearer_auth(token)
            .json(&json!({
                "questionId": question_id,
                "content": "This is a sufficiently long answer body for validation."
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "answer creation should succeed");

        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Cast a vote and return the resulting vote count.
    async fn vote(&self, token: &str, path: &str, vote_type: &str) -> i64 {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&json!({ "voteType": vote_type }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "vote should succeed");

        let body: Value = resp.json().await.unwrap();
        body["data"]["voteCount"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_register_login_me() {
    let fixture = TestFixture::new().await;

    let (token, user_id) = fixture.register("alice").await;

    // Login with the same credentials
    let login_resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login_resp.status(), 200);
    let login_body: Value = login_resp.json().await.unwrap();
    assert_eq!(login_body["data"]["user"]["username"], "alice");

    // Wrong password
    let bad_resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_resp.status(), 401);
    let bad_body: Value = bad_resp.json().await.unwrap();
    assert_eq!(bad_body["success"], false);
    assert_eq!(bad_body["error"]["code"], "UNAUTHORIZED");

    // /auth/me resolves the token to the registered user
    let me_resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(me_resp.status(), 200);
    let me_body: Value = me_resp.json().await.unwrap();
    assert_eq!(me_body["data"]["id"], user_id.as_str());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let fixture = TestFixture::new().await;

    fixture.register("bob").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/register"))
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "hunter2hunter2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/questions"))
        .json(&json!({
            "title": "A question without any credentials",
            "content": "This body is long enough to pass validation checks.",
            "tags": ["auth"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_question_crud() {
    let fixture = TestFixture::new().await;
    let (token, user_id) = fixture.register("carol").await;

    let question_id = fixture
        .post_question(&token, "How do I test an axum router?", &["rust", "testing"])
        .await;

    // Detail view increments the view counter
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);
    let get_body: Value = get_resp.json().await.unwrap();
    assert_eq!(get_body["data"]["views"], 1);
    assert_eq!(get_body["data"]["author"]["id"], user_id.as_str());
    assert_eq!(get_body["data"]["tags"][0], "rust");

    let get_again: Value = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(get_again["data"]["views"], 2);

    // Update
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/questions/{}", question_id)))
        .bearer_auth(&token)
        .json(&json!({ "title": "How do I integration-test an axum router?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(
        update_body["data"]["title"],
        "How do I integration-test an axum router?"
    );

    // Non-author cannot update
    let (other_token, _) = fixture.register("mallory").await;
    let forbidden_resp = fixture
        .client
        .put(fixture.url(&format!("/api/questions/{}", question_id)))
        .bearer_auth(&other_token)
        .json(&json!({ "title": "Hijacked question title here" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden_resp.status(), 403);
    let forbidden_body: Value = forbidden_resp.json().await.unwrap();
    assert_eq!(forbidden_body["error"]["code"], "FORBIDDEN");

    // List
    let list_resp = fixture
        .client
        .get(fixture.url("/api/questions"))
        .send()
        .await
        .unwrap();
    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"]["questions"].as_array().unwrap().len(), 1);
    assert_eq!(list_body["data"]["pagination"]["total"], 1);

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/questions/{}", question_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let gone_resp = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(gone_resp.status(), 404);
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("dave").await;

    // Title too short
    let resp = fixture
        .client
        .post(fixture.url("/api/questions"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "short",
            "content": "This body is long enough to pass validation checks.",
            "tags": ["rust"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Too many tags
    let resp2 = fixture
        .client
        .post(fixture.url("/api/questions"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "A validly sized question title",
            "content": "This body is long enough to pass validation checks.",
            "tags": ["a", "b", "c", "d", "e", "f"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 400);

    // Malformed vote direction is rejected before reaching the ledger
    let question_id = fixture
        .post_question(&token, "A question to vote on later", &["voting"])
        .await;
    let resp3 = fixture
        .client
        .post(fixture.url(&format!("/api/questions/{}/vote", question_id)))
        .bearer_auth(&token)
        .json(&json!({ "voteType": "sideways" }))
        .send()
        .await
        .unwrap();
    assert!(resp3.status().is_client_error());
}

#[tokio::test]
async fn test_vote_toggle_walk() {
    let fixture = TestFixture::new().await;
    let (author_token, _) = fixture.register("erin").await;
    let (voter_token, _) = fixture.register("frank").await;

    let question_id = fixture
        .post_question(&author_token, "Which database should I pick?", &["db"])
        .await;
    let answer_id = fixture.post_answer(&author_token, &question_id).await;
    let vote_path = format!("/api/answers/{}/vote", answer_id);

    // upvote: 0 -> 1
    assert_eq!(fixture.vote(&voter_token, &vote_path, "upvote").await, 1);
    // upvote again retracts: 1 -> 0
    assert_eq!(fixture.vote(&voter_token, &vote_path, "upvote").await, 0);
    // downvote: 0 -> -1
    assert_eq!(fixture.vote(&voter_token, &vote_path, "downvote").await, -1);
    // switching direction removes the downvote: -1 -> 1
    assert_eq!(fixture.vote(&voter_token, &vote_path, "upvote").await, 1);
}

#[tokio::test]
async fn test_votes_from_different_users_both_land() {
    let fixture = TestFixture::new().await;
    let (author_token, _) = fixture.register("grace").await;
    let (voter1, _) = fixture.register("heidi").await;
    let (voter2, _) = fixture.register("ivan").await;

    let question_id = fixture
        .post_question(&author_token, "Is voting on my own question fine?", &["meta"])
        .await;
    let vote_path = format!("/api/questions/{}/vote", question_id);

    assert_eq!(fixture.vote(&voter1, &vote_path, "upvote").await, 1);
    assert_eq!(fixture.vote(&voter2, &vote_path, "upvote").await, 2);
    // Voting on one's own content is allowed
    assert_eq!(fixture.vote(&author_token, &vote_path, "downvote").await, 1);

    // Derived count is reflected in the listing
    let list_body: Value = fixture
        .client
        .get(fixture.url("/api/questions?sort=voteCount"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list_body["data"]["questions"][0]["voteCount"], 1);
}

#[tokio::test]
async fn test_vote_on_missing_entity_is_not_found() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("judy").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/answers/no-such-answer/vote"))
        .bearer_auth(&token)
        .json(&json!({ "voteType": "upvote" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_accept_answer_handoff() {
    let fixture = TestFixture::new().await;
    let (asker_token, _) = fixture.register("kim").await;
    let (answerer1, _) = fixture.register("leo").await;
    let (answerer2, _) = fixture.register("mia").await;

    let question_id = fixture
        .post_question(&asker_token, "What is the borrow checker for?", &["rust"])
        .await;
    let a1 = fixture.post_answer(&answerer1, &question_id).await;
    let a2 = fixture.post_answer(&answerer2, &question_id).await;

    // Non-author cannot accept, and nothing changes
    let forbidden_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/accept", a1)))
        .bearer_auth(&answerer1)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden_resp.status(), 403);
    let forbidden_body: Value = forbidden_resp.json().await.unwrap();
    assert_eq!(forbidden_body["error"]["code"], "FORBIDDEN");

    let detail: Value = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(detail["data"]["acceptedAnswerId"].is_null());

    // Author accepts the first answer
    let accept1_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/accept", a1)))
        .bearer_auth(&asker_token)
        .send()
        .await
        .unwrap();
    assert_eq!(accept1_resp.status(), 200);
    let accept1_body: Value = accept1_resp.json().await.unwrap();
    assert_eq!(accept1_body["data"]["isAccepted"], true);

    // Acceptance moves to the second answer; the first is unaccepted
    let accept2_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/accept", a2)))
        .bearer_auth(&asker_token)
        .send()
        .await
        .unwrap();
    assert_eq!(accept2_resp.status(), 200);

    let detail: Value = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["acceptedAnswerId"], a2.as_str());

    let answers = detail["data"]["answers"].as_array().unwrap();
    let accepted: Vec<&Value> = answers
        .iter()
        .filter(|a| a["isAccepted"] == true)
        .collect();
    assert_eq!(accepted.len(), 1, "exactly one answer may be accepted");
    assert_eq!(accepted[0]["id"], a2.as_str());

    // Accepting the already-accepted answer is a successful no-op
    let idem_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/accept", a2)))
        .bearer_auth(&asker_token)
        .send()
        .await
        .unwrap();
    assert_eq!(idem_resp.status(), 200);
    let idem_body: Value = idem_resp.json().await.unwrap();
    assert_eq!(idem_body["data"]["isAccepted"], true);
}

#[tokio::test]
async fn test_deleting_accepted_answer_clears_pointer() {
    let fixture = TestFixture::new().await;
    let (asker_token, _) = fixture.register("nina").await;
    let (answerer, _) = fixture.register("oscar").await;

    let question_id = fixture
        .post_question(&asker_token, "Why does my test hang forever?", &["async"])
        .await;
    let answer_id = fixture.post_answer(&answerer, &question_id).await;

    fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/accept", answer_id)))
        .bearer_auth(&asker_token)
        .send()
        .await
        .unwrap();

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/answers/{}", answer_id)))
        .bearer_auth(&answerer)
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let detail: Value = fixture
        .client
        .get(fixture.url(&format!("/api/questions/{}", question_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(detail["data"]["acceptedAnswerId"].is_null());
    assert_eq!(detail["data"]["answerCount"], 0);
}

#[tokio::test]
async fn test_answer_edit_history_and_comments() {
    let fixture = TestFixture::new().await;
    let (asker_token, _) = fixture.register("peggy").await;
    let (answerer, _) = fixture.register("quinn").await;

    let question_id = fixture
        .post_question(&asker_token, "How should I structure my modules?", &["rust"])
        .await;
    let answer_id = fixture.post_answer(&answerer, &question_id).await;

    // Edit the answer; the prior content lands in the history
    let edit_resp = fixture
        .client
        .put(fixture.url(&format!("/api/answers/{}", answer_id)))
        .bearer_auth(&answerer)
        .json(&json!({
            "content": "A revised answer body that is still long enough to pass."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit_resp.status(), 200);
    let edit_body: Value = edit_resp.json().await.unwrap();
    assert_eq!(edit_body["data"]["isEdited"], true);
    let history = edit_body["data"]["editHistory"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0]["content"],
        "This is a sufficiently long answer body for validation."
    );

    // Non-author cannot edit
    let forbidden_resp = fixture
        .client
        .put(fixture.url(&format!("/api/answers/{}", answer_id)))
        .bearer_auth(&asker_token)
        .json(&json!({
            "content": "Trying to overwrite someone else's answer content here."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden_resp.status(), 403);

    // Comment on the answer
    let comment_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/comments", answer_id)))
        .bearer_auth(&asker_token)
        .json(&json!({ "content": "Thanks, this helped!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(comment_resp.status(), 200);
    let comment_body: Value = comment_resp.json().await.unwrap();
    let comments = comment_body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "Thanks, this helped!");
    assert_eq!(comments[0]["author"]["username"], "peggy");

    // Empty comment is rejected
    let empty_resp = fixture
        .client
        .post(fixture.url(&format!("/api/answers/{}/comments", answer_id)))
        .bearer_auth(&asker_token)
        .json(&json!({ "content": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_resp.status(), 400);
}

#[tokio::test]
async fn test_user_profile_counters_and_stats() {
    let fixture = TestFixture::new().await;
    let (token, user_id) = fixture.register("rita").await;
    let (other_token, _) = fixture.register("sam").await;

    let q1 = fixture
        .post_question(&token, "First question about something", &["one"])
        .await;
    fixture
        .post_question(&token, "Second question about something", &["two"])
        .await;
    fixture.post_answer(&token, &q1).await;

    // Denormalized counters on the profile
    let profile: Value = fixture
        .client
        .get(fixture.url(&format!("/api/users/{}", user_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["data"]["questionsCount"], 2);
    assert_eq!(profile["data"]["answersCount"], 1);

    // Recomputed stats agree, and votes received are included
    let vote_path = format!("/api/questions/{}/vote", q1);
    fixture.vote(&other_token, &vote_path, "upvote").await;

    let stats: Value = fixture
        .client
        .get(fixture.url(&format!("/api/users/{}/stats", user_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["data"]["stats"]["totalQuestions"], 2);
    assert_eq!(stats["data"]["stats"]["totalAnswers"], 1);
    assert_eq!(stats["data"]["stats"]["totalVotes"], 1);

    // Profile update
    let update_resp = fixture
        .client
        .put(fixture.url("/api/users/me"))
        .bearer_auth(&token)
        .json(&json!({ "bio": "I ask a lot of questions." }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["bio"], "I ask a lot of questions.");

    // User search finds by bio substring
    let search_body: Value = fixture
        .client
        .get(fixture.url("/api/users/search/questions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(search_body["data"]["users"][0]["username"], "rita");
}

#[tokio::test]
async fn test_question_pagination_and_tag_filter() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("tina").await;

    for i in 0..3 {
        fixture
            .post_question(
                &token,
                &format!("Numbered question number {}", i),
                if i == 0 { &["special"] } else { &["common"] },
            )
            .await;
    }

    let page1: Value = fixture
        .client
        .get(fixture.url("/api/questions?page=1&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page1["data"]["questions"].as_array().unwrap().len(), 2);
    assert_eq!(page1["data"]["pagination"]["total"], 3);
    assert_eq!(page1["data"]["pagination"]["pages"], 2);

    let page2: Value = fixture
        .client
        .get(fixture.url("/api/questions?page=2&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page2["data"]["questions"].as_array().unwrap().len(), 1);

    let tagged: Value = fixture
        .client
        .get(fixture.url("/api/questions?tag=special"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tagged["data"]["questions"].as_array().unwrap().len(), 1);
    assert_eq!(tagged["data"]["questions"][0]["tags"][0], "special");
}

#[tokio::test]
async fn test_search_endpoint() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("ursula").await;

    fixture
        .post_question(&token, "How to reset a forgotten password", &["security"])
        .await;
    fixture
        .post_question(&token, "Onboarding flow for new employees", &["hr"])
        .await;

    // Wait for search index commit
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let search_resp = fixture
        .client
        .get(fixture.url("/api/search?q=password&limit=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(search_resp.status(), 200);
    let search_body: Value = search_resp.json().await.unwrap();
    assert_eq!(search_body["success"], true);

    let results = search_body["data"]["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results[0]["question"]["title"]
        .as_str()
        .unwrap()
        .contains("password"));
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_stats_endpoints() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("viktor").await;

    fixture
        .post_question(&token, "A question tagged with rust", &["rust"])
        .await;
    fixture
        .post_question(&token, "Another question tagged rust", &["rust", "sqlite"])
        .await;

    let tags_body: Value = fixture
        .client
        .get(fixture.url("/api/stats/tags"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tags = tags_body["data"].as_array().unwrap();
    assert_eq!(tags[0]["tag"], "rust");
    assert_eq!(tags[0]["count"], 2);

    let activity_body: Value = fixture
        .client
        .get(fixture.url("/api/stats/activity"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let activity = activity_body["data"].as_array().unwrap();
    assert_eq!(activity.len(), 1, "both questions were asked today");
    assert_eq!(activity[0]["count"], 2);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/users/no-such-user"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp2 = fixture
        .client
        .get(fixture.url("/api/questions/no-such-question"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 404);
}
