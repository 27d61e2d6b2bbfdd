mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_generates_display_name() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "hana", "password": "pa55word" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "hana");
    assert!(body["user"].get("passwordHash").is_none());

    let display_name = body["user"]["displayName"].as_str().unwrap();
    assert!(display_name.starts_with("user_"));
    assert_eq!(display_name.len(), "user_".len() + 6);
}

#[tokio::test]
async fn test_register_rejects_missing_and_duplicate() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/auth/register", None, json!({ "username": "hana" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    app.signup("hana").await;
    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "hana", "password": "other" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();
    app.signup("hana").await;

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "ghost", "password": "pa55word" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "hana", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_protected_routes_need_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/posts", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "AUTH_REQUIRED");

    let (status, body) = app.get("/api/posts", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_INVALID");

    let (_, token) = app.signup("hana").await;
    let (status, body) = app.get("/api/posts", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("hana").await;

    let forged = tripnote_server::auth::TokenKeys::new("some-other-secret", 60)
        .issue(user_id)
        .unwrap();
    let (status, _) = app.get("/api/users/me/mimics", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_then_deactivate() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/users/me/password",
            Some(&token),
            Some(json!({ "currentPassword": "wrong", "newPassword": "fresh-one" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/users/me/password",
            Some(&token),
            Some(json!({ "currentPassword": "pa55word", "newPassword": "fresh-one" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "hana", "password": "fresh-one" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/api/users/me/deactivate", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Both the old token and a fresh login are refused now
    let (status, _) = app.get("/api/posts", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "hana", "password": "fresh-one" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
