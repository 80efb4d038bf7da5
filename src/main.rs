//! Q&A Forum Backend
//!
//! A production-grade REST backend for a StackOverflow-style forum with
//! SQLite persistence and Tantivy full-text search.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod search;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Q&A Forum Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.jwt_secret == "insecure-dev-secret-change-me" {
        tracing::warn!("QNA_JWT_SECRET is not set. Using an insecure development secret!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from database
    tracing::info!("Building search index...");
    let (questions, total) = repo
        .list_questions(1, i64::MAX, db::QuestionSort::CreatedAt, true, None)
        .await?;
    search.rebuild(&questions).await?;
    tracing::info!("Search index built with {} questions", total);

    // Create application state
    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes. Mutating endpoints authenticate via the AuthUser extractor.
    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/auth/me", get(api::me))
        // Questions
        .route("/questions", get(api::list_questions))
        .route("/questions", post(api::create_question))
        .route("/questions/{id}", get(api::get_question))
        .route("/questions/{id}", put(api::update_question))
        .route("/questions/{id}", delete(api::delete_question))
        .route("/questions/{id}/vote", post(api::vote_question))
        .route("/questions/{id}/answers", get(api::list_answers))
        // Answers
        .route("/answers", post(api::create_answer))
        .route("/answers/{id}", put(api::update_answer))
        .route("/answers/{id}", delete(api::delete_answer))
        .route("/answers/{id}/vote", post(api::vote_answer))
        .route("/answers/{id}/accept", post(api::accept_answer))
        .route("/answers/{id}/comments", post(api::add_comment))
        // Users
        .route("/users/me", put(api::update_profile))
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}/questions", get(api::get_user_questions))
        .route("/users/{id}/answers", get(api::get_user_answers))
        .route("/users/{id}/stats", get(api::get_user_stats))
        .route("/users/search/{query}", get(api::search_users))
        .route("/users/top/contributors", get(api::top_contributors))
        // Search
        .route("/search", get(api::search_questions))
        // Dashboard stats
        .route("/stats/tags", get(api::tag_stats))
        .route("/stats/activity", get(api::activity_stats));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
