use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tripnote_types::{AgeGroup, Post, Profile, ProfileView, UpdateProfileRequest};

use super::{ApiError, ApiJson, ApiResult};
use crate::db::repositories::{PostRepository, ProfileRepository, UserRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /api/profiles/:username - Public profile with follow counts
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileView>> {
    let view = ProfileRepository::new(state.db.pool.clone())
        .get_view(&username)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(view))
}

/// GET /api/profiles/:username/posts - The user's visible posts, newest first
pub async fn get_profile_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let pool = state.db.pool.clone();
    let user = UserRepository::new(pool.clone())
        .get_by_username(&username)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let posts = PostRepository::new(pool).list_by_author(&user.id)?;
    Ok(Json(posts))
}

/// PUT /api/profiles/me - Update the provided, non-empty fields
pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    if let Some(raw) = payload.age_group.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if AgeGroup::parse(raw).is_none() {
            return Err(ApiError::BadRequest(format!("Unknown age group: {raw}")));
        }
    }

    let profile = ProfileRepository::new(state.db.pool.clone()).update(&auth.user_id, &payload)?;
    Ok(Json(profile))
}
