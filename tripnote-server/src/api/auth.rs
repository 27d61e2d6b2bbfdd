use axum::{extract::State, Extension, Json};
use serde_json::json;
use tripnote_types::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};

use super::{ApiError, ApiJson, ApiResult};
use crate::auth::{generate_display_name, hash_password, verify_password};
use crate::db::repositories::{is_unique_violation, UserRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(format!("hashing task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, stored_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("hashing task failed: {e}")))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/auth/register - Create an account and its profile
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(username), Some(password)) = (required(payload.username), required(payload.password))
    else {
        return Err(ApiError::BadRequest("Username and password are required".to_string()));
    };
    let username = username.trim().to_string();

    let repo = UserRepository::new(state.db.pool.clone());
    if repo.get_by_username(&username)?.is_some() {
        return Err(ApiError::BadRequest("Username is already taken".to_string()));
    }

    let display_name = required(payload.display_name).unwrap_or_else(generate_display_name);
    let password_hash = hash_blocking(password).await?;

    let user = repo
        .create(&username, &password_hash, &display_name)
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::BadRequest("Username is already taken".to_string())
            } else {
                e.into()
            }
        })?;

    tracing::info!(user_id = %user.id, "registered user {}", user.username);
    Ok(Json(json!({
        "message": "User registered successfully",
        "user": user,
    })))
}

/// POST /api/auth/login - Verify the password and issue a 24h access token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.pool.clone());

    let stored = repo
        .get_credentials(payload.username.trim())?
        .ok_or_else(|| ApiError::NotFound("Account does not exist".to_string()))?;

    if !stored.user.is_active {
        return Err(ApiError::Unauthorized("This account has been deactivated".to_string()));
    }

    if !verify_blocking(payload.password, stored.password_hash).await? {
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    }

    let access_token = state.tokens.issue(stored.user.id)?;

    Ok(Json(LoginResponse {
        id: stored.user.id,
        username: stored.user.username,
        access_token,
    }))
}

/// PUT /api/users/me/password - Replace the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if payload.new_password.trim().is_empty() {
        return Err(ApiError::BadRequest("New password is required".to_string()));
    }

    let repo = UserRepository::new(state.db.pool.clone());
    let current_hash = repo
        .get_password_hash(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_blocking(payload.current_password, current_hash).await? {
        return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
    }

    let new_hash = hash_blocking(payload.new_password).await?;
    repo.set_password(&auth.user_id, &new_hash)?;

    Ok(Json(json!({ "message": "Password updated" })))
}

/// POST /api/users/me/deactivate - Disable the caller's account
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<serde_json::Value>> {
    UserRepository::new(state.db.pool.clone()).deactivate(&auth.user_id)?;
    tracing::info!(user_id = %auth.user_id, "account deactivated");

    Ok(Json(json!({ "message": "Account deactivated" })))
}
