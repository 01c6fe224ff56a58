//! Intercepting HTTP client
//!
//! Every request is matched against the owning server's handler stack before
//! any I/O happens. Simulated responses are built in place; passthrough and
//! bypassed requests are executed on a real `reqwest::Client` and buffered.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument};

use crate::error::{ClientError, ClientResult};
use crate::fixtures::SimulatedResponse;
use crate::server::{Interception, Shared};

/// Request as the system under test would send it
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: &str) -> ClientResult<Self> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a JSON body and content type
    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Fully buffered response, simulated or real
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub url: Url,
    pub status: StatusCode,
    /// Reason phrase; simulated errors carry theirs verbatim
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// HTTP client bound to an interception server
#[derive(Debug, Clone)]
pub struct InterceptingClient {
    shared: Arc<Shared>,
    http: reqwest::Client,
}

impl InterceptingClient {
    pub(crate) fn new(shared: Arc<Shared>, http: reqwest::Client) -> Self {
        Self { shared, http }
    }

    pub async fn get(&self, url: &str) -> ClientResult<HttpResponse> {
        self.send(OutgoingRequest::new(Method::GET, url)?).await
    }

    pub async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> ClientResult<HttpResponse> {
        self.send(OutgoingRequest::new(Method::POST, url)?.json(body)?)
            .await
    }

    pub async fn put(&self, url: &str, body: impl Into<Bytes>) -> ClientResult<HttpResponse> {
        self.send(OutgoingRequest::new(Method::PUT, url)?.body(body))
            .await
    }

    /// Send a request through the handler stack
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: OutgoingRequest) -> ClientResult<HttpResponse> {
        match self.shared.intercept(&request.method, &request.url)? {
            Interception::Respond(response) => deliver(response, request.url),
            Interception::Passthrough => self.forward(request).await,
            Interception::Bypass => {
                let method = request.method.clone();
                let url = request.url.clone();
                let response = self.forward(request).await?;
                self.shared.notify_bypass(&method, &url, &response);
                Ok(response)
            }
        }
    }

    /// Execute the request against the real network
    async fn forward(&self, request: OutgoingRequest) -> ClientResult<HttpResponse> {
        let url = request.url.clone();
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "Forwarded request failed");
            if e.is_connect() {
                ClientError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                ClientError::Upstream(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response.bytes().await?;
        debug!(url = %final_url, status = %status, body_len = body.len(), "Forwarded request completed");

        Ok(HttpResponse {
            url: final_url,
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Turn a simulated response into what the caller observes
fn deliver(response: SimulatedResponse, url: Url) -> ClientResult<HttpResponse> {
    match response {
        SimulatedResponse::Success {
            status,
            headers,
            body,
        } => Ok(HttpResponse {
            url,
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        }),
        SimulatedResponse::HttpError {
            status,
            status_text,
        } => Ok(HttpResponse {
            url,
            status,
            status_text,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }),
        SimulatedResponse::NetworkFailure => Err(ClientError::Transport {
            url: url.to_string(),
            message: "simulated network failure".to_string(),
        }),
    }
}
