mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;
use tripnote_server::middleware::TOKEN_HEADER;

#[tokio::test]
async fn test_create_post_and_read_it_back() {
    let app = TestApp::new();
    let (author_id, token) = app.signup("hana").await;

    let (status, post) = app
        .post(
            "/api/posts",
            Some(&token),
            json!({
                "content": "Two days around Higashiyama",
                "locationName": "Kyoto",
                "images": [
                    { "url": "/uploads/b.png", "sortOrder": 1 },
                    { "url": "/uploads/a.png", "sortOrder": 0 }
                ],
                "routePoints": [
                    { "lat": 34.9949, "lon": 135.7850, "name": "Kiyomizu-dera" },
                    { "lat": 35.0037, "lon": 135.7788, "name": "Yasaka Shrine", "transportToNext": "bus" }
                ],
                "tripData": { "totalBudget": 30000, "accommodationNames": "Ryokan A, Ryokan B" },
                "tags": ["Kyoto", "kyoto"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{post}");
    assert_eq!(post["authorId"], author_id.to_string());
    assert_eq!(post["images"][0]["imageUrl"], "/uploads/a.png");
    assert_eq!(post["routePoints"][0]["orderIndex"], 0);
    assert_eq!(post["routePoints"][1]["orderIndex"], 1);
    assert_eq!(
        post["tripData"]["accommodationNames"],
        json!(["Ryokan A", "Ryokan B"])
    );
    assert_eq!(post["tags"].as_array().unwrap().len(), 2);

    // Single post view is public and carries comments
    let id = post["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "Two days around Higashiyama");
    assert_eq!(fetched["comments"], json!([]));
}

#[tokio::test]
async fn test_create_post_validation() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, _) = app
        .post("/api/posts", Some(&token), json!({ "content": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An out-of-range coordinate aborts the whole post
    let (status, _) = app
        .post(
            "/api/posts",
            Some(&token),
            json!({ "content": "bad route", "routePoints": [{ "lat": 95.0, "lon": 10.0 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, feed) = app.get("/api/posts", Some(&token)).await;
    assert_eq!(feed, json!([]));
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, body) = app
        .post(
            "/api/posts",
            Some(&token),
            json!({ "content": "x", "images": [{ "caption": "no url" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("url"));

    let (status, body) = app
        .post(
            "/api/posts",
            Some(&token),
            json!({ "content": "x", "routePoints": [{ "lat": 1.0, "lon": 2.0, "transportToNext": "rocket" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app
        .post("/api/auth/login", None, json!(["hana", "secret"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let id = app.create_post(&token, json!({ "content": "Kamakura" })).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/posts/{id}/mimic"))
        .header(TOKEN_HEADER, token.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_transport_mode_accepts_any_case() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, post) = app
        .post(
            "/api/posts",
            Some(&token),
            json!({ "content": "x", "routePoints": [{ "lat": 1.0, "lon": 2.0, "transportToNext": "Train" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{post}");
    assert_eq!(post["routePoints"][0]["transportToNext"], "train");
}

#[tokio::test]
async fn test_mimic_without_body() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;
    let id = app.create_post(&token, json!({ "content": "Nikko" })).await;

    let (status, body) = app
        .request(Method::POST, &format!("/api/posts/{id}/mimic"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["mimic"]["notes"].is_null());
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;
    app.create_post(&token, json!({ "content": "Café in ÉTRETAT" })).await;

    let (status, found) = app
        .get("/api/posts?search=%C3%A9tretat", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_limit_above_maximum_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, body) = app.get("/api/posts?limit=101", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("100"));
}

#[tokio::test]
async fn test_feed_filters_and_order() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    app.create_post(&token, json!({ "content": "Temples", "tags": ["Kyoto"] }))
        .await;
    app.create_post(&token, json!({ "content": "Ramen crawl", "tags": ["food"] }))
        .await;
    app.create_post(&token, json!({ "content": "More temples", "tags": ["Kyoto"] }))
        .await;

    let (_, feed) = app.get("/api/posts", Some(&token)).await;
    let contents: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["More temples", "Ramen crawl", "Temples"]);

    let (_, tagged) = app.get("/api/posts?tag=Kyoto", Some(&token)).await;
    assert_eq!(tagged.as_array().unwrap().len(), 2);

    let (_, lower) = app.get("/api/posts?tag=kyoto", Some(&token)).await;
    assert_eq!(lower, json!([]));

    let (_, searched) = app.get("/api/posts?search=RAMEN", Some(&token)).await;
    assert_eq!(searched[0]["content"], "Ramen crawl");

    let (_, paged) = app.get("/api/posts?page=2&limit=2", Some(&token)).await;
    assert_eq!(paged.as_array().unwrap().len(), 1);
    assert_eq!(paged[0]["content"], "Temples");

    let (status, _) = app.get("/api/posts?ageGroup=ancient", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_following_feed() {
    let app = TestApp::new();
    let (_, hana) = app.signup("hana").await;
    let (kenji_id, kenji) = app.signup("kenji").await;
    app.create_post(&kenji, json!({ "content": "Osaka at night" })).await;

    let (status, feed) = app.get("/api/posts?type=following", Some(&hana)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed, json!([]));

    let (_, body) = app
        .post(&format!("/api/users/{kenji_id}/follow"), Some(&hana), json!({}))
        .await;
    assert_eq!(body["following"], true);

    let (_, feed) = app.get("/api/posts?type=following", Some(&hana)).await;
    assert_eq!(feed[0]["content"], "Osaka at night");
}

#[tokio::test]
async fn test_follow_rules() {
    let app = TestApp::new();
    let (hana_id, hana) = app.signup("hana").await;
    let (kenji_id, _) = app.signup("kenji").await;

    let (status, _) = app
        .post(&format!("/api/users/{hana_id}/follow"), Some(&hana), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/api/users/{}/follow", uuid::Uuid::new_v4()),
            Some(&hana),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/users/{kenji_id}/follow");
    let (_, first) = app.post(&uri, Some(&hana), json!({})).await;
    let (_, second) = app.post(&uri, Some(&hana), json!({})).await;
    assert_eq!(first["message"], "Followed");
    assert_eq!(second["message"], "Unfollowed");
    assert_eq!(second["following"], false);
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;
    let id = app.create_post(&token, json!({ "content": "Nara deer" })).await;
    let uri = format!("/api/posts/{id}/like");

    let (_, liked) = app.post(&uri, Some(&token), json!({})).await;
    assert_eq!(liked["liked"], true);
    let (_, post) = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(post["likes"].as_array().unwrap().len(), 1);

    let (_, unliked) = app.post(&uri, Some(&token), json!({})).await;
    assert_eq!(unliked["liked"], false);
    let (_, post) = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(post["likes"], json!([]));
}

#[tokio::test]
async fn test_mimic_lifecycle() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;
    let id = app.create_post(&token, json!({ "content": "Hakone loop" })).await;
    let uri = format!("/api/posts/{id}/mimic");

    let (status, body) = app
        .post(&uri, Some(&token), json!({ "note": "next spring" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mimic"]["notes"], "next spring");

    let (status, _) = app.post(&uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, mine) = app.get("/api/users/me/mimics", Some(&token)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["post"]["content"], "Hakone loop");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;
    let id = app.create_post(&token, json!({ "content": "Onsen" })).await;
    let uri = format!("/api/posts/{id}/comment");

    let (status, _) = app.post(&uri, Some(&token), json!({ "content": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, comment) = app
        .post(&uri, Some(&token), json!({ "content": "Which one?" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["username"], "hana");

    let (_, post) = app.get(&format!("/api/posts/{id}"), None).await;
    assert_eq!(post["comments"][0]["content"], "Which one?");
}

#[tokio::test]
async fn test_soft_delete() {
    let app = TestApp::new();
    let (_, hana) = app.signup("hana").await;
    let (_, kenji) = app.signup("kenji").await;
    let id = app.create_post(&hana, json!({ "content": "Fushimi Inari" })).await;
    let uri = format!("/api/posts/{id}");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&kenji), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request(Method::DELETE, &uri, Some(&hana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["postId"], id);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.request(Method::DELETE, &uri, Some(&hana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post(&format!("{uri}/like"), Some(&kenji), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, feed) = app.get("/api/posts", Some(&kenji)).await;
    assert_eq!(feed, json!([]));
}

#[tokio::test]
async fn test_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let (_, token) = app.signup("hana").await;

    let (status, _) = app.get("/api/posts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post("/api/posts/not-a-uuid/like", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
