//! Storage target integration tests
//!
//! Uploads under the event-ingestion prefix are accepted; anything else on
//! the storage base URL is a fatal configuration error.

use interceptor::{ClientError, Config, InterceptError, Outcome, Target};

use crate::common::{constants::STORAGE_URL, listening_server};

#[tokio::test]
async fn test_event_upload_accepted() {
    let server = listening_server(&Config::default());
    server.respond_with_default().unwrap();

    let response = server
        .client()
        .put(
            &format!("{}/langfuse/events/project-1/trace/evt-42.json", STORAGE_URL),
            r#"{"id":"evt-42"}"#,
        )
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.text(), "Success");
    assert!(server.verify().is_ok());

    let recorded = server.received_requests();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].target, Some(Target::Storage));
    assert_eq!(recorded[0].outcome, Outcome::Responded);
}

#[tokio::test]
async fn test_other_storage_path_is_fatal() {
    let server = listening_server(&Config::default());
    server.respond_with_default().unwrap();

    let err = server
        .client()
        .get(&format!("{}/langfuse/exports/batch.csv", STORAGE_URL))
        .await
        .unwrap_err();

    match err {
        ClientError::Intercept(InterceptError::UnexpectedPath { path, .. }) => {
            assert_eq!(path, "/langfuse/exports/batch.csv");
        }
        other => panic!("expected unexpected-path error, got {:?}", other),
    }

    // Recorded even if the caller swallowed it
    assert!(matches!(
        server.verify(),
        Err(InterceptError::UnexpectedPath { .. })
    ));
}

#[tokio::test]
async fn test_storage_prefix_is_configurable() {
    let config = Config {
        storage_base_url: "http://minio.test:9000/".to_string(),
        storage_ingestion_prefix: "/events-bucket/".to_string(),
        ..Config::default()
    };
    let server = listening_server(&config);
    server.respond_with_default().unwrap();
    let client = server.client();

    assert!(client
        .put("http://minio.test:9000/events-bucket/a.json", "{}")
        .await
        .is_ok());
    assert!(client
        .put("http://minio.test:9000/langfuse/events/a.json", "{}")
        .await
        .is_err());
}
