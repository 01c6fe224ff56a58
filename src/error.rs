//! Error types for the interception harness
//!
//! [`InterceptError`] covers harness failures: lifecycle misuse and the fatal
//! test-configuration signals. [`ClientError`] is what a caller of the
//! intercepting client sees, and keeps simulated transport failures apart
//! from anything that carries an HTTP status.

use reqwest::Method;
use thiserror::Error;

use crate::server::Lifecycle;

/// Harness-level errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterceptError {
    #[error("`{operation}` is not valid while the server is {state}")]
    Lifecycle {
        operation: &'static str,
        state: Lifecycle,
    },

    #[error("No handler matched {method} {url}")]
    UnmatchedRequest { method: Method, url: String },

    #[error("Unexpected path {path} for storage request {url}")]
    UnexpectedPath { url: String, path: String },

    #[error("Failed to serialize fixture: {0}")]
    Serialization(String),
}

impl InterceptError {
    /// Whether this error should fail the running test
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InterceptError::UnmatchedRequest { .. } | InterceptError::UnexpectedPath { .. }
        )
    }
}

impl From<serde_json::Error> for InterceptError {
    fn from(err: serde_json::Error) -> Self {
        InterceptError::Serialization(err.to_string())
    }
}

/// Errors surfaced to code sending requests through the intercepting client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not connect to {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Intercept(#[from] InterceptError),

    #[error("HTTP client error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// True for connection-level failures, simulated or real
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Upstream(err) => err.is_connect(),
            _ => false,
        }
    }
}

/// Result type alias for harness operations
pub type InterceptResult<T> = Result<T, InterceptError>;

/// Result type alias for client calls
pub type ClientResult<T> = Result<T, ClientError>;
