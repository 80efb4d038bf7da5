//! Authentication endpoints: register, login, current user.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::{self, AuthUser, MIN_PASSWORD_LENGTH};
use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Username length bounds.
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 30;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication payload returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - Create a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let username = request.username.trim();
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if !request.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user = state
        .repo
        .create_user(username, request.email.trim(), &password_hash)
        .await?;

    let token = auth::generate_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )
    .map_err(|e| AppError::Internal(format!("Token generation error: {}", e)))?;

    success(AuthResponse { token, user })
}

/// POST /api/auth/login - Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let credentials = state.repo.find_credentials(request.email.trim()).await?;

    // Same error for unknown email and wrong password.
    let (user, password_hash) = credentials
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !auth::verify_password(&request.password, &password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = auth::generate_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )
    .map_err(|e| AppError::Internal(format!("Token generation error: {}", e)))?;

    success(AuthResponse { token, user })
}

/// GET /api/auth/me - The authenticated caller's own profile.
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> ApiResult<User> {
    let user = state
        .repo
        .get_user(&caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", caller.user_id)))?;

    success(user)
}
