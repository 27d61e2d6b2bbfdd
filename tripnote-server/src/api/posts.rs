use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;
use tripnote_types::{Comment, CommentRequest, CreatePostRequest, Post};

use super::{parse_id, ApiError, ApiJson, ApiResult};
use crate::db::repositories::{EngagementRepository, FollowRepository, PostRepository};
use crate::feed::{self, FeedFilter, FeedParams};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /api/posts - Filtered, paginated feed
///
/// `limit` must be between 1 and 100; anything else is a 400.
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<FeedParams>,
) -> ApiResult<Json<Vec<Post>>> {
    let filter = FeedFilter::from_params(params)?;
    let pool = state.db.pool.clone();

    let following = if filter.following_only {
        Some(FollowRepository::new(pool.clone()).following_ids(&auth.user_id)?)
    } else {
        None
    };

    let Some(query) = feed::compose(&filter, following.as_deref()) else {
        return Ok(Json(Vec::new()));
    };

    let posts = PostRepository::new(pool).list_feed(&query)?;
    Ok(Json(posts))
}

/// POST /api/posts - Create a post with all of its children atomically
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<Json<Post>> {
    let content = payload
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Post content cannot be empty".to_string()))?
        .to_string();

    let post = PostRepository::new(state.db.pool.clone())
        .create_with_children(&auth.user_id, &content, &payload)?;

    tracing::info!(post_id = %post.id, author_id = %auth.user_id, "created post");
    Ok(Json(post))
}

/// GET /api/posts/:id - Single post with comments
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Post>> {
    let post_id = parse_id(&post_id, "Post")?;

    let post = PostRepository::new(state.db.pool.clone())
        .get_visible(&post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// POST /api/posts/:id/like - Toggle the caller's like
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let post_id = parse_id(&post_id, "Post")?;

    let liked = EngagementRepository::new(state.db.pool.clone())
        .toggle_like(&auth.user_id, &post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let message = if liked { "Liked" } else { "Unliked" };
    Ok(Json(json!({ "message": message, "liked": liked })))
}

/// POST /api/posts/:id/comment - Append a comment
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> ApiResult<Json<Comment>> {
    let post_id = parse_id(&post_id, "Post")?;
    let content = payload
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Comment content cannot be empty".to_string()))?;

    let comment = EngagementRepository::new(state.db.pool.clone())
        .add_comment(&auth.user_id, &post_id, content)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(comment))
}

/// DELETE /api/posts/:id - Owner-only soft delete
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let post_id = parse_id(&post_id, "Post")?;
    let post_repo = PostRepository::new(state.db.pool.clone());

    let meta = post_repo
        .get_meta(&post_id)?
        .filter(|m| !m.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if meta.author_id != auth.user_id {
        return Err(ApiError::Forbidden("You can only delete your own posts".to_string()));
    }

    if !post_repo.soft_delete(&post_id)? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    tracing::info!(post_id = %post_id, "soft deleted post");
    Ok(Json(json!({
        "message": "Post deleted successfully",
        "postId": post_id,
    })))
}
