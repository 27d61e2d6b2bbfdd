use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use tripnote_types::UserDetail;

use super::{parse_id, ApiError, ApiResult};
use crate::db::repositories::{FollowRepository, ProfileRepository, UserRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /api/users/:id/follow - Toggle following another user
pub async fn toggle_follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let target = parse_id(&user_id, "User")?;
    if target == auth.user_id {
        return Err(ApiError::BadRequest("Cannot follow yourself".to_string()));
    }

    let following = FollowRepository::new(state.db.pool.clone())
        .toggle_follow(&auth.user_id, &target)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let message = if following { "Followed" } else { "Unfollowed" };
    Ok(Json(json!({ "message": message, "following": following })))
}

/// GET /api/users/:id - User with profile, post count and follow lists
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserDetail>> {
    let user_id = parse_id(&user_id, "User")?;
    let pool = state.db.pool.clone();
    let user_repo = UserRepository::new(pool.clone());
    let follow_repo = FollowRepository::new(pool.clone());

    let user = user_repo
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserDetail {
        profile: ProfileRepository::new(pool).get(&user_id)?,
        post_count: user_repo.post_count(&user_id)?,
        followers: follow_repo.followers(&user_id)?,
        following: follow_repo.following(&user_id)?,
        user,
    }))
}
