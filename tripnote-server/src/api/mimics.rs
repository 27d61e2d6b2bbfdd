use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::json;
use tripnote_types::{Mimic, MimicRequest};

use super::{parse_id, ApiError, ApiResult};
use crate::db::repositories::{EngagementRepository, MimicOutcome};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /api/posts/:id/mimic - Bookmark a post
pub async fn add_mimic(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    payload: Result<Json<MimicRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let post_id = parse_id(&post_id, "Post")?;
    // The body is optional; only a body that was sent and is malformed fails
    let note = match payload {
        Ok(Json(req)) => req.note,
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return Err(rejection.into()),
    };

    let repo = EngagementRepository::new(state.db.pool.clone());
    match repo.add_mimic(&auth.user_id, &post_id, note.as_deref())? {
        MimicOutcome::Created(mimic) => Ok(Json(json!({
            "message": "Post mimicked successfully",
            "mimic": mimic,
        }))),
        MimicOutcome::AlreadyMimicked => {
            Err(ApiError::BadRequest("Already mimicked this post".to_string()))
        }
        MimicOutcome::PostNotFound => Err(ApiError::NotFound("Post not found".to_string())),
    }
}

/// DELETE /api/posts/:id/mimic - Remove a bookmark
pub async fn remove_mimic(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let post_id = parse_id(&post_id, "Mimic record")?;

    let removed = EngagementRepository::new(state.db.pool.clone())
        .remove_mimic(&auth.user_id, &post_id)?;
    if !removed {
        return Err(ApiError::NotFound("Mimic record not found".to_string()));
    }

    Ok(Json(json!({ "message": "Un-mimicked successfully" })))
}

/// GET /api/users/me/mimics - The caller's bookmarks, newest first
pub async fn my_mimics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Mimic>>> {
    let mimics = EngagementRepository::new(state.db.pool.clone()).list_mimics(&auth.user_id)?;
    Ok(Json(mimics))
}
