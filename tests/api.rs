//! HTTP-level API tests
//!
//! Exercise the full router against an in-memory database: auth flows,
//! post visibility, error envelope codes, and the wire shapes.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use inkpress::api::{build_router, AppState};
use inkpress::config::Config;
use inkpress::db::{create_test_pool, migrations};

async fn server() -> TestServer {
    let pool = create_test_pool().await.expect("test pool");
    migrations::run_migrations(&pool).await.expect("migrations");

    let config = Config::default();
    let state = AppState::new(pool, &config);
    let app = build_router(state, &config.server.cors_origin);
    TestServer::new(app).expect("test server")
}

/// Register a user and return a session token.
async fn register_and_login(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": email,
            "first_name": "Test",
            "last_name": "User",
            "password": "password123",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"email": email, "password": "password123"}))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .expect("token")
        .to_string()
}

fn post_body(slug: &str, title: &str) -> Value {
    json!({
        "title": title,
        "slug": slug,
        "summary": "A summary",
        "content": "Some content",
        "published_at": "2024-01-01T00:00:00Z",
        "tags": [],
    })
}

#[tokio::test]
async fn test_unauthenticated_create_is_rejected_without_side_effects() {
    let server = server().await;

    let response = server.post("/api/v1/posts").json(&post_body("x", "X")).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let response = server.get("/api/v1/posts").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["total"], 0);
}

#[tokio::test]
async fn test_create_and_read_post_round_trip() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    let tag_response = server
        .post("/api/v1/tags")
        .authorization_bearer(&token)
        .json(&json!({"value": "rust"}))
        .await;
    tag_response.assert_status(StatusCode::CREATED);

    let mut body = post_body("hello-world", "Hello World");
    body["tags"] = json!(["rust"]);
    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);

    let created = response.json::<Value>();
    assert_eq!(created["slug"], "hello-world");
    assert_eq!(created["author"], "author@example.com");
    assert_eq!(created["tags"], json!(["rust"]));

    let response = server.get("/api/v1/posts/hello-world").await;
    response.assert_status_ok();
    let fetched = response.json::<Value>();
    assert_eq!(fetched["title"], "Hello World");
    assert_eq!(fetched["summary"], "A summary");
    assert_eq!(fetched["content"], "Some content");
    assert_eq!(fetched["author"], "author@example.com");
    assert_eq!(fetched["tags"], json!(["rust"]));
}

#[tokio::test]
async fn test_autogenerated_slug() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "My Title!",
            "autogenerate_slug": true,
            "summary": "",
            "content": "body",
            "tags": [],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["slug"], "my-title");

    // Neither a slug nor autogeneration is a validation error
    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "No Slug",
            "summary": "",
            "content": "body",
            "tags": [],
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_draft_visibility() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;
    let other = register_and_login(&server, "other@example.com").await;

    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "Draft",
            "slug": "draft",
            "summary": "",
            "content": "unpublished",
            "tags": [],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    // Anonymous and other users get a 404, the owner a 200
    server
        .get("/api/v1/posts/draft")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/posts/draft")
        .authorization_bearer(&other)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/posts/draft")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    // Same rule for listings
    let anon = server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(anon["total"], 0);
    let own = server
        .get("/api/v1/posts")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(own["total"], 1);
}

#[tokio::test]
async fn test_unknown_period_is_rejected() {
    let server = server().await;

    let response = server.get("/api/v1/posts/by-time/fortnight").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    server
        .get("/api/v1/posts/by-time/week")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_author_impersonation_is_forbidden() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;
    register_and_login(&server, "victim@example.com").await;

    let mut body = post_body("impersonation", "Impersonation");
    body["author"] = json!("victim@example.com");
    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&post_body("taken", "First"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&post_body("taken", "Second"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_update_and_delete_are_author_only() {
    let server = server().await;
    let author = register_and_login(&server, "author@example.com").await;
    let other = register_and_login(&server, "other@example.com").await;

    server
        .post("/api/v1/posts")
        .authorization_bearer(&author)
        .json(&post_body("mine", "Mine"))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .put("/api/v1/posts/mine")
        .authorization_bearer(&other)
        .json(&json!({"title": "Hijacked"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .put("/api/v1/posts/mine")
        .authorization_bearer(&author)
        .json(&json!({"title": "Renamed"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["title"], "Renamed");

    server
        .delete("/api/v1/posts/mine")
        .authorization_bearer(&other)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete("/api/v1/posts/mine")
        .authorization_bearer(&author)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/api/v1/posts/mine")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_jwt_flow() {
    let server = server().await;
    register_and_login(&server, "author@example.com").await;

    let response = server
        .post("/api/v1/jwt")
        .json(&json!({"email": "author@example.com", "password": "password123"}))
        .await;
    response.assert_status_ok();
    let pair = response.json::<Value>();
    let access = pair["access"].as_str().expect("access token");
    let refresh = pair["refresh"].as_str().expect("refresh token");

    // The access token authenticates requests
    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(access)
        .json(&post_body("via-jwt", "Via JWT"))
        .await;
    response.assert_status(StatusCode::CREATED);

    // The refresh token does not
    server
        .post("/api/v1/posts")
        .authorization_bearer(refresh)
        .json(&post_body("via-refresh", "Via Refresh"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // But it buys a new pair
    let response = server
        .post("/api/v1/jwt/refresh")
        .json(&json!({"refresh": refresh}))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["access"].is_string());

    // Bad credentials are a 401
    server
        .post("/api/v1/jwt")
        .json(&json!({"email": "author@example.com", "password": "wrong"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    server
        .get("/api/v1/auth/me")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    server
        .post("/api/v1/auth/logout")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/api/v1/auth/me")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_lookup_exposes_only_public_fields() {
    let server = server().await;
    register_and_login(&server, "author@example.com").await;

    let response = server.get("/api/v1/users/author@example.com").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["email"], "author@example.com");
    assert_eq!(body["first_name"], "Test");
    assert!(body.get("id").is_none());
    assert!(body.get("password_hash").is_none());

    server
        .get("/api/v1/users/nobody@example.com")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_flow() {
    let server = server().await;
    let author = register_and_login(&server, "author@example.com").await;
    let reader = register_and_login(&server, "reader@example.com").await;

    server
        .post("/api/v1/posts")
        .authorization_bearer(&author)
        .json(&post_body("hello", "Hello"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/comments")
        .authorization_bearer(&reader)
        .json(&json!({"post": "hello", "content": "First!"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let comment = response.json::<Value>();
    assert_eq!(comment["author"], "reader@example.com");
    let comment_id = comment["id"].as_i64().expect("comment id");

    let response = server.get("/api/v1/posts/hello/comments").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().map(Vec::len), Some(1));

    // Only the comment's author may delete it
    server
        .delete(&format!("/api/v1/comments/{}", comment_id))
        .authorization_bearer(&author)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete(&format!("/api/v1/comments/{}", comment_id))
        .authorization_bearer(&reader)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_profile_flow() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    server
        .get("/api/v1/auth/profile")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .put("/api/v1/auth/profile")
        .authorization_bearer(&token)
        .json(&json!({"bio": "I write things"}))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/api/v1/auth/profile")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["bio"], "I write things");
}

#[tokio::test]
async fn test_tag_filtered_listing() {
    let server = server().await;
    let token = register_and_login(&server, "author@example.com").await;

    for value in ["rust", "web"] {
        server
            .post("/api/v1/tags")
            .authorization_bearer(&token)
            .json(&json!({"value": value}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let mut tagged = post_body("tagged", "Tagged");
    tagged["tags"] = json!(["rust"]);
    server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&tagged)
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&post_body("plain", "Plain"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/v1/tags/rust/posts").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["posts"][0]["slug"], "tagged");

    // An unknown tag value names nothing
    server
        .get("/api/v1/tags/ghost/posts")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Referencing an unknown tag from a post is a validation error
    let mut bad = post_body("bad-tag", "Bad Tag");
    bad["tags"] = json!(["ghost"]);
    let response = server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&bad)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
