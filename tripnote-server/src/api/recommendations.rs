use axum::{extract::State, Extension, Json};
use tripnote_types::{LocationRecommendation, UserSummary};

use super::ApiResult;
use crate::db::repositories::RecommendationRepository;
use crate::middleware::AuthUser;
use crate::state::AppState;

const USER_SUGGESTIONS: u32 = 5;
const LOCATION_SUGGESTIONS: u32 = 3;

/// GET /api/recommendations/users
pub async fn recommended_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = RecommendationRepository::new(state.db.pool.clone())
        .users(&auth.user_id, USER_SUGGESTIONS)?;
    Ok(Json(users))
}

/// GET /api/recommendations/locations
pub async fn recommended_locations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<LocationRecommendation>>> {
    let locations = RecommendationRepository::new(state.db.pool.clone())
        .locations(LOCATION_SUGGESTIONS)?;
    Ok(Json(locations))
}
