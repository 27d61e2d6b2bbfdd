use axum::{extract::State, Json};
use tripnote_types::TagCount;

use super::ApiResult;
use crate::db::repositories::TagRepository;
use crate::state::AppState;

const POPULAR_TAG_LIMIT: u32 = 50;

/// GET /api/tags/popular - Most used tags first
pub async fn popular_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<TagCount>>> {
    let tags = TagRepository::new(state.db.pool.clone()).popular(POPULAR_TAG_LIMIT)?;
    Ok(Json(tags))
}
