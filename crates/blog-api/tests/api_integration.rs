//! Integration tests for the API client
//!
//! These tests use wiremock to stand in for the blog backend and exercise
//! the full request/response cycle and response classification.

use blog_api::{
    ApiClient, ApiClientConfig, ApiError, BlogApi, Credentials, ErrorKind, HttpStatusClassifier,
    PostDraft,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiClientConfig::new(server.uri())).unwrap()
}

fn expired_body() -> serde_json::Value {
    serde_json::json!({
        "description": "Signature has expired",
        "error": "Invalid token",
        "status_code": 401
    })
}

// =============================================================================
// Successful Request Tests
// =============================================================================

#[tokio::test]
async fn test_whoami_sends_jwt_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("Authorization", "JWT abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"username": "alice"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let me = client_for(&mock_server).whoami("abc").await.unwrap();
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn test_create_post_sends_draft_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create"))
        .and(header("Authorization", "JWT abc"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({"title": "T", "content": "C"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3, "title": "T", "content": "C"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = client_for(&mock_server)
        .create_post("abc", &PostDraft::new("T", "C"))
        .await
        .unwrap();
    assert_eq!(created["id"], 3);
}

#[tokio::test]
async fn test_sign_in_has_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_json(serde_json::json!({"username": "alice", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok"})),
        )
        .mount(&mock_server)
        .await;

    let token = client_for(&mock_server)
        .sign_in(&Credentials::new("alice", "pw"))
        .await
        .unwrap();
    assert_eq!(token.access_token, "tok");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_sign_up_accepts_any_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newuser"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"message": "created"})),
        )
        .mount(&mock_server)
        .await;

    client_for(&mock_server)
        .sign_up(&Credentials::new("bob", "pw"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_posts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "first", "content": "hello"},
            {"id": 2, "title": "second", "content": "world"}
        ])))
        .mount(&mock_server)
        .await;

    let posts = client_for(&mock_server).list_posts("abc").await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].title, "second");
}

#[tokio::test]
async fn test_custom_scheme_and_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("X-Client", "tests"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"username": "alice"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ApiClientConfig::new(mock_server.uri())
        .with_auth_scheme("Bearer")
        .with_header("X-Client", "tests");
    let client = ApiClient::new(config).unwrap();

    client.whoami("abc").await.unwrap();
}

// =============================================================================
// Classification Tests
// =============================================================================

#[tokio::test]
async fn test_embedded_401_is_auth_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(ResponseTemplate::new(401).set_body_json(expired_body()))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).whoami("stale").await.unwrap_err();
    assert_eq!(error, ApiError::AuthRejected { status: 401 });
    assert_eq!(error.kind(), ErrorKind::AuthRejected);
}

#[tokio::test]
async fn test_bare_401_is_unknown_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).whoami("stale").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unknown);
}

#[tokio::test]
async fn test_http_status_classifier_plugs_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_classifier(Arc::new(HttpStatusClassifier));
    let error = client.whoami("stale").await.unwrap_err();
    assert!(error.is_auth_rejected());
}

#[tokio::test]
async fn test_server_error_is_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "description": "Something went wrong"
        })))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .create_post("abc", &PostDraft::new("T", "C"))
        .await
        .unwrap_err();

    match error {
        ApiError::Unknown { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "Something went wrong");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).whoami("abc").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unknown);
}

// =============================================================================
// Network Failure Tests
// =============================================================================

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 9 of localhost in the test environment
    let client = ApiClient::new(
        ApiClientConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let error = client.whoami("abc").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"username": "slow"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = ApiClientConfig::new(mock_server.uri()).with_timeout(Duration::from_millis(50));
    let client = ApiClient::new(config).unwrap();

    let error = client.whoami("abc").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_unsendable_token_is_unknown_error() {
    let mock_server = MockServer::start().await;

    // A newline cannot appear in a header value
    let error = client_for(&mock_server).whoami("abc\ndef").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert!(matches!(error, ApiError::Unknown { status: None, .. }));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
