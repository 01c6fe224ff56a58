//! Mock backing service for passthrough traffic
//!
//! Provides wiremock-based endpoints for:
//! - GET /ping, POST / - analytics store (ClickHouse HTTP interface)
//! - PUT /devstoreaccount1/{container}/{blob} - blob store (Azurite)
//! - POST /v1/chat/completions - the real completion API
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! backend.mock_analytics_ping().await;
//!
//! // Use backend.uri() as the analytics base URL
//! ```

use interceptor::ChatCompletion;
use serde_json::json;
use wiremock::{
    matchers::{method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

/// Mock backing service wrapper
pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    /// Start a new mock backing service
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Get all requests that actually reached this service
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    // =========================================================================
    // Analytics store
    // =========================================================================

    /// Mock the analytics health endpoint
    pub async fn mock_analytics_ping(&self) {
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok.\n"))
            .mount(&self.server)
            .await;
    }

    /// Mock a JSON query result
    pub async fn mock_analytics_query(&self, rows: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": [],
                "data": rows,
                "rows": rows.as_array().map(|r| r.len()).unwrap_or(0),
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Blob store
    // =========================================================================

    /// Mock a successful blob upload
    pub async fn mock_blob_upload(&self) {
        Mock::given(method("PUT"))
            .and(path_regex(r"^/devstoreaccount1/[^/]+/.+$"))
            .respond_with(ResponseTemplate::new(201).insert_header("ETag", "\"0x8D\""))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Upstream completion API
    // =========================================================================

    /// Mock the real completion endpoint
    pub async fn mock_chat_completion_success(&self, response: &ChatCompletion) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Mock the real completion endpoint rejecting the key
    pub async fn mock_chat_completion_unauthorized(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Invalid API key provided",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })))
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_starts() {
        let backend = MockBackend::start().await;
        assert!(!backend.uri().is_empty());
    }

    #[tokio::test]
    async fn test_mock_analytics_ping() {
        let backend = MockBackend::start().await;
        backend.mock_analytics_ping().await;

        let response = reqwest::get(format!("{}/ping", backend.uri()))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "Ok.\n");
        assert_eq!(backend.received_requests().await.len(), 1);
    }
}
