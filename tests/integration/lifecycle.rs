//! Lifecycle integration tests
//!
//! Tests for setup, reset and teardown:
//! - One instance shared by consecutive tests does not leak fixtures
//! - Teardown is idempotent and stops interception

use interceptor::{ClientError, Config, InterceptError, InterceptionServer, Lifecycle};
use reqwest::StatusCode;

use crate::common::{constants::COMPLETION_URL, listening_server, test_data};

#[tokio::test]
async fn test_reset_between_tests_prevents_leakage() {
    let server = listening_server(&Config::default());
    let client = server.client();

    // First "test": expects an error fixture
    server
        .respond_with_error(StatusCode::BAD_GATEWAY, "Bad Gateway")
        .unwrap();
    let response = client
        .post_json(COMPLETION_URL, &test_data::chat_request())
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    server.reset().unwrap();

    // Second "test": installed nothing, so the old fixture must be gone
    let err = client
        .post_json(COMPLETION_URL, &test_data::chat_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Intercept(InterceptError::UnmatchedRequest { .. })
    ));
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let server = listening_server(&Config::default());

    server.reset().unwrap();
    server.reset().unwrap();

    assert_eq!(server.state(), Lifecycle::Listening);
    assert!(server.received_requests().is_empty());
}

#[tokio::test]
async fn test_teardown_stops_interception() {
    let server = listening_server(&Config::default());
    server.respond_with_default().unwrap();
    let client = server.client();

    server.teardown();
    server.teardown();

    let err = client
        .post_json(COMPLETION_URL, &test_data::chat_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Intercept(InterceptError::Lifecycle {
            state: Lifecycle::Closed,
            ..
        })
    ));
    assert!(matches!(
        server.respond_with_network_error(),
        Err(InterceptError::Lifecycle { .. })
    ));
}

#[tokio::test]
async fn test_client_before_setup_is_rejected() {
    let server = InterceptionServer::new(&Config::default()).unwrap();
    let client = server.client();

    let err = client.get(COMPLETION_URL).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Intercept(InterceptError::Lifecycle {
            state: Lifecycle::Uninitialized,
            ..
        })
    ));
}

#[tokio::test]
async fn test_instances_are_isolated() {
    let first = listening_server(&Config::default());
    let second = listening_server(&Config::default());

    first.respond_with_default().unwrap();

    let ok = first
        .client()
        .post_json(COMPLETION_URL, &test_data::chat_request())
        .await;
    let unmatched = second
        .client()
        .post_json(COMPLETION_URL, &test_data::chat_request())
        .await;

    assert!(ok.is_ok());
    assert!(unmatched.is_err());
    assert!(first.verify().is_ok());
    assert!(second.verify().is_err());
}
