use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tripnote_types::PlaceSuggestion;

use super::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocalSearchQuery {
    pub query: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Both coordinates as given by the client, untouched
pub(crate) fn coordinates(query: CoordinateQuery) -> ApiResult<(String, String)> {
    match (non_empty(query.lat), non_empty(query.lon)) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(ApiError::BadRequest("lat and lon are required".to_string())),
    }
}

/// GET /api/proxy/nominatim/search?q=
pub async fn nominatim_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let q = non_empty(query.q)
        .ok_or_else(|| ApiError::BadRequest("q is required".to_string()))?;

    let result = state.geocoder.search(&q).await?;
    Ok(Json(result))
}

/// GET /api/proxy/nominatim/reverse?lat=&lon=
pub async fn nominatim_reverse(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<Value>> {
    let (lat, lon) = coordinates(query)?;
    let result = state.geocoder.reverse(&lat, &lon).await?;
    Ok(Json(result))
}

/// GET /api/proxy/yahoo-local-search?query=
pub async fn yahoo_local_search(
    State(state): State<AppState>,
    Query(query): Query<LocalSearchQuery>,
) -> ApiResult<Json<Vec<PlaceSuggestion>>> {
    let query = non_empty(query.query)
        .ok_or_else(|| ApiError::BadRequest("query is required".to_string()))?;

    let suggestions = state.yahoo.local_suggestions(&query).await?;
    Ok(Json(suggestions))
}
