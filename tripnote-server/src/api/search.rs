use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use super::geocode::{coordinates, CoordinateQuery};
use super::ApiResult;
use crate::geocoding::YahooEndpoint;
use crate::state::AppState;

/// GET /api/search/local - Yahoo local search, every query param forwarded
pub async fn local(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.yahoo.fetch(YahooEndpoint::LocalSearch, &params).await?))
}

/// GET /api/search/geo - Yahoo geocoder, every query param forwarded
pub async fn geo(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.yahoo.fetch(YahooEndpoint::Geocoder, &params).await?))
}

/// GET /api/search/reverse-geo?lat=&lon=
pub async fn reverse_geo(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<Value>> {
    let (lat, lon) = coordinates(query)?;
    let params = [("lat".to_string(), lat), ("lon".to_string(), lon)];
    Ok(Json(state.yahoo.fetch(YahooEndpoint::ReverseGeocoder, &params).await?))
}

/// GET /api/search/place-info?lat=&lon=
pub async fn place_info(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<Value>> {
    let (lat, lon) = coordinates(query)?;
    let params = [("lat".to_string(), lat), ("lon".to_string(), lon)];
    Ok(Json(state.yahoo.fetch(YahooEndpoint::PlaceInfo, &params).await?))
}
