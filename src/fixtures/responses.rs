//! Simulated responses

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;

use crate::error::InterceptResult;

/// Outcome delivered to the caller for an intercepted request
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedResponse {
    /// A normal response built locally
    Success {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// An HTTP error status with no body
    HttpError { status: StatusCode, status_text: String },
    /// The connection could not be established
    NetworkFailure,
}

impl SimulatedResponse {
    /// `200 OK` with a JSON body
    pub fn json<T: Serialize>(payload: &T) -> InterceptResult<Self> {
        let body = serde_json::to_vec(payload)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(SimulatedResponse::Success {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body),
        })
    }

    /// `200 OK` with a plain-text body
    pub fn text(body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain;charset=UTF-8"),
        );

        SimulatedResponse::Success {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body.into()),
        }
    }

    /// HTTP error with an arbitrary reason phrase and empty body
    pub fn http_error(status: StatusCode, status_text: impl Into<String>) -> Self {
        SimulatedResponse::HttpError {
            status,
            status_text: status_text.into(),
        }
    }

    /// Connection-level failure, surfaced as a transport error
    pub fn network_failure() -> Self {
        SimulatedResponse::NetworkFailure
    }

    /// Short label for the variant, logged when a response is served
    pub fn kind(&self) -> &'static str {
        match self {
            SimulatedResponse::Success { .. } => "success",
            SimulatedResponse::HttpError { .. } => "http_error",
            SimulatedResponse::NetworkFailure => "network_failure",
        }
    }
}
