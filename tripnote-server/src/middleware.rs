use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::ApiError;
use crate::db::repositories::UserRepository;
use crate::state::AppState;

pub const TOKEN_HEADER: &str = "x-access-token";

/// Identity resolved from the access token, available to protected handlers
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Reject requests without a valid access token.
///
/// Missing header is 403, a bad or expired token or one for an inactive or
/// deleted account is 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::AuthRequired("No token provided".to_string()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo
        .get_by_id(&claims.id)?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(AuthUser { user_id: user.id });
    Ok(next.run(request).await)
}
