//! Common test utilities for the interception harness
//!
//! Shared configuration builders and small helpers used across the
//! integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use interceptor::{BypassObserver, Config, InterceptionServer};
use reqwest::StatusCode;
use serde_json::json;

use crate::mocks::MockBackend;

/// Test configuration constants
pub mod constants {
    /// Completion URL for the default configuration
    pub const COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
    /// Storage base URL for the default configuration
    pub const STORAGE_URL: &str = "http://localhost:9090";
    /// Analytics base URL for the default configuration
    pub const ANALYTICS_URL: &str = "http://localhost:8123";
    /// Blob base URL for the default configuration
    pub const BLOB_URL: &str = "http://localhost:10000";
}

/// One mock backing service per passthrough-capable target
pub struct Backends {
    pub completion: MockBackend,
    pub analytics: MockBackend,
    pub blob: MockBackend,
}

impl Backends {
    /// Start all backing services
    pub async fn start() -> Self {
        Self {
            completion: MockBackend::start().await,
            analytics: MockBackend::start().await,
            blob: MockBackend::start().await,
        }
    }

    /// Config pointing the targets at the backing services.
    ///
    /// Storage keeps its default base URL; it is never forwarded.
    pub fn config(&self, has_active_key: bool) -> Config {
        Config {
            completion_api_url: format!("{}/v1", self.completion.uri()),
            analytics_base_url: format!("{}/", self.analytics.uri()),
            blob_base_url: self.blob.uri(),
            has_active_key,
            ..Config::default()
        }
    }

    /// Completion URL on the upstream backing service
    pub fn completion_url(&self) -> String {
        format!("{}/v1/chat/completions", self.completion.uri())
    }
}

/// Create a server and start listening
pub fn listening_server(config: &Config) -> InterceptionServer {
    interceptor::init_tracing();
    let server = InterceptionServer::new(config).expect("Failed to create interception server");
    server.setup().expect("Failed to set up interception server");
    server
}

/// Observer that records the status of every bypassed response
pub fn recording_observer() -> (BypassObserver, Arc<Mutex<Vec<StatusCode>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer = BypassObserver::new(move |event| {
        sink.lock().unwrap().push(event.response.status);
    });
    (observer, seen)
}

/// Sample request data for tests
pub mod test_data {
    use super::*;

    /// Chat completion request the system under test would send
    pub fn chat_request() -> serde_json::Value {
        json!({
            "model": "gpt-3.5-turbo-0125",
            "messages": [
                {
                    "role": "user",
                    "content": "Why did the scarecrow win an award?"
                }
            ],
            "tools": [
                {
                    "type": "function",
                    "function": { "name": "extract" }
                }
            ]
        })
    }
}
