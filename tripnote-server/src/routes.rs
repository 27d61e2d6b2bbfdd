use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api;
use crate::middleware::require_auth;
use crate::state::AppState;

async fn health_check() -> &'static str {
    "OK"
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.max_upload_bytes + api::upload::MULTIPART_OVERHEAD;

    let public = Router::new()
        // Auth
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        // Reads
        .route("/api/posts/:id", get(api::posts::get_post))
        .route("/api/profiles/:username", get(api::profiles::get_profile))
        .route("/api/profiles/:username/posts", get(api::profiles::get_profile_posts))
        .route("/api/users/:id", get(api::users::get_user))
        .route("/api/tags/popular", get(api::tags::popular_tags))
        // Geocoding
        .route("/api/proxy/nominatim/search", get(api::geocode::nominatim_search))
        .route("/api/proxy/nominatim/reverse", get(api::geocode::nominatim_reverse))
        .route("/api/proxy/yahoo-local-search", get(api::geocode::yahoo_local_search))
        .route("/api/search/local", get(api::search::local))
        .route("/api/search/geo", get(api::search::geo))
        .route("/api/search/reverse-geo", get(api::search::reverse_geo))
        .route("/api/search/place-info", get(api::search::place_info));

    let protected = Router::new()
        // Posts
        .route("/api/posts", get(api::posts::list_posts).post(api::posts::create_post))
        .route("/api/posts/:id", delete(api::posts::delete_post))
        .route("/api/posts/:id/like", post(api::posts::toggle_like))
        .route("/api/posts/:id/comment", post(api::posts::add_comment))
        .route(
            "/api/posts/:id/mimic",
            post(api::mimics::add_mimic).delete(api::mimics::remove_mimic),
        )
        // Users
        .route("/api/users/me/mimics", get(api::mimics::my_mimics))
        .route("/api/users/me/password", put(api::auth::change_password))
        .route("/api/users/me/deactivate", post(api::auth::deactivate))
        .route("/api/users/:id/follow", post(api::users::toggle_follow))
        .route("/api/profiles/me", put(api::profiles::update_my_profile))
        .route("/api/recommendations/users", get(api::recommendations::recommended_users))
        .route(
            "/api/recommendations/locations",
            get(api::recommendations::recommended_locations),
        )
        .route("/api/upload", post(api::upload::upload_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .merge(public)
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
