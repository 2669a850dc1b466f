//! Authentication integration tests.
//!
//! Tests verify:
//! - Login issues decodable tokens for the configured credential pair
//! - Malformed login bodies are rejected without issuing a token
//! - Protected routes enforce the bearer-token contract

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use item_gateway::TokenAuth;

use super::test_utils::{test_app, MockItemStore, TEST_SECRET};

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn item_request_with_auth(uri: &str, auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// Login: Success
// =============================================================================

#[tokio::test]
async fn test_login_success_returns_decodable_token() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"svc","password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let token = json["token"].as_str().expect("response should carry a token");

    let claims = TokenAuth::new(TEST_SECRET).verify(token).unwrap();
    assert_eq!(claims.username, "svc");
    assert_eq!(claims.id, 2);
}

#[tokio::test]
async fn test_login_pings_the_store() {
    let store = MockItemStore::new();
    let pings = store.ping_counter();
    let app = test_app(store);

    let request = login_request(r#"{"username":"svc","password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The liveness round-trip runs exactly once per attempt.
    assert_eq!(pings.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Login: Malformed Bodies
// =============================================================================

#[tokio::test]
async fn test_login_missing_username_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Username and password are required");
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn test_login_missing_password_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"svc"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_empty_fields_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"","password":""}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_invalid_json_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request("not json at all");
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Login: Credential Mismatch
// =============================================================================

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"svc","password":"wrong"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Invalid login data");
}

#[tokio::test]
async fn test_login_wrong_username_rejected() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"admin","password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_credentials_are_case_sensitive() {
    let app = test_app(MockItemStore::new());

    let request = login_request(r#"{"username":"SVC","password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Login: Backend Failure
// =============================================================================

#[tokio::test]
async fn test_login_store_failure_is_internal_error() {
    let app = test_app(MockItemStore::new().failing_ping());

    let request = login_request(r#"{"username":"svc","password":"correct"}"#);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Internal server error");
}

// =============================================================================
// Bearer Token Enforcement
// =============================================================================

#[tokio::test]
async fn test_missing_header_unauthenticated() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    let request = item_request_with_auth("/api/items/42", None);
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "No token available");
}

#[tokio::test]
async fn test_empty_token_segment_unauthenticated() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    let request = item_request_with_auth("/api/items/42", Some("Bearer "));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Missing token");
}

#[tokio::test]
async fn test_scheme_without_token_unauthenticated() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    let request = item_request_with_auth("/api/items/42", Some("Bearer"));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_key_token_forbidden() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    let token = TokenAuth::new("some-other-secret").issue("svc").unwrap();
    let request = item_request_with_auth("/api/items/42", Some(&format!("Bearer {token}")));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Token invalid or expired");
}

#[tokio::test]
async fn test_expired_token_forbidden() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    // Issued 61 minutes ago; past the 1-hour validity window.
    let issued = std::time::SystemTime::now() - Duration::from_secs(61 * 60);
    let token = TokenAuth::new(TEST_SECRET).issue_at("svc", issued).unwrap();

    let request = item_request_with_auth("/api/items/42", Some(&format!("Bearer {token}")));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_garbage_token_forbidden() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    let request = item_request_with_auth("/api/items/42", Some("Bearer not.a.jwt"));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_issued_token_grants_access() {
    let app = test_app(MockItemStore::new().with_item("42", 17.5));

    // Full round-trip: login, then use the returned token.
    let request = login_request(r#"{"username":"svc","password":"correct"}"#);
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let token = json["token"].as_str().unwrap().to_string();

    let request = item_request_with_auth("/api/items/42", Some(&format!("Bearer {token}")));
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
