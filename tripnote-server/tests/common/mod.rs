#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tripnote_server::auth::TokenKeys;
use tripnote_server::db::Database;
use tripnote_server::geocoding::{
    GeocodeError, GeocodeUpstream, GeocodingProxy, InMemoryGeocodeStore, YahooClient,
};
use tripnote_server::middleware::TOKEN_HEADER;
use tripnote_server::routes;
use tripnote_server::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Geocoder that answers locally and counts how often it was asked
#[derive(Default)]
pub struct CountingUpstream {
    pub calls: AtomicUsize,
}

impl CountingUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeUpstream for CountingUpstream {
    async fn search(&self, query: &str) -> Result<Value, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!([{ "display_name": query, "lat": "35.0116", "lon": "135.7681" }]))
    }

    async fn reverse(&self, lat: &str, lon: &str) -> Result<Value, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "display_name": format!("{lat},{lon}") }))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upstream: Arc<CountingUpstream>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(5 * 1024 * 1024)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let upstream = Arc::new(CountingUpstream::default());
        let geocoder = GeocodingProxy::new(
            Arc::new(InMemoryGeocodeStore::new()),
            upstream.clone(),
            Duration::from_secs(3600),
            Duration::ZERO,
        );
        // No client id, so Yahoo routes fail before any network call
        let yahoo = YahooClient::new("http://127.0.0.1:9", None, Duration::from_secs(1))
            .expect("Failed to build Yahoo client");

        let state = AppState {
            db,
            tokens: TokenKeys::new(TEST_SECRET, 86_400),
            geocoder: Arc::new(geocoder),
            yahoo,
            upload_dir: upload_dir(),
            max_upload_bytes,
        };

        Self {
            router: routes::app(state.clone()),
            state,
            upstream,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register an account and log it in, returning its id and access token
    pub async fn signup(&self, username: &str) -> (Uuid, String) {
        let (status, _) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "username": username, "password": "pa55word" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register {username}");

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "username": username, "password": "pa55word" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {username}");

        let id = body["id"].as_str().expect("id").parse().expect("uuid");
        let token = body["accessToken"].as_str().expect("token").to_string();
        (id, token)
    }

    /// Create a post and return its id
    pub async fn create_post(&self, token: &str, body: Value) -> String {
        let (status, post) = self.post("/api/posts", Some(token), body).await;
        assert_eq!(status, StatusCode::OK, "create post: {post}");
        post["id"].as_str().expect("post id").to_string()
    }
}

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("tripnote-uploads-{}", Uuid::new_v4().simple()))
}
