//! Handler factory
//!
//! Builds target-specific handlers from the configured base URLs. URLs are
//! normalized once here, so predicates compare against a stable form.

use reqwest::{Method, Url};
use serde::Serialize;

use super::{Action, Handler, Target};
use crate::config::{sanitize_base, Config};
use crate::error::InterceptResult;
use crate::fixtures::SimulatedResponse;

/// Body returned for accepted storage uploads
pub const STORAGE_ACCEPTED_BODY: &str = "Success";

/// Builds handlers for the fixed set of intercepted targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFactory {
    completion_url: String,
    storage_base_url: String,
    analytics_base_url: String,
    blob_base_url: String,
    storage_ingestion_prefix: String,
}

impl HandlerFactory {
    /// Create a factory for the targets in `config`
    pub fn new(config: &Config) -> Self {
        Self {
            completion_url: normalize_url(&config.completion_url()),
            storage_base_url: normalize_url(&config.storage_base_url),
            analytics_base_url: normalize_url(&config.analytics_base_url),
            blob_base_url: normalize_url(&config.blob_base_url),
            storage_ingestion_prefix: config.storage_ingestion_prefix.clone(),
        }
    }

    pub fn completion_url(&self) -> &str {
        &self.completion_url
    }

    /// POST to the completion endpoint answered with `response`
    pub fn completion(&self, response: SimulatedResponse) -> Handler {
        Handler::new(
            Target::ChatCompletion,
            self.completion_url.clone(),
            Some(Method::POST),
            Action::Respond(response),
        )
    }

    /// Completion handler answering with a JSON payload
    pub fn json_completion<T: Serialize>(&self, payload: &T) -> InterceptResult<Handler> {
        Ok(self.completion(SimulatedResponse::json(payload)?))
    }

    /// Any method on the storage base URL; accepts event uploads only
    pub fn storage(&self) -> Handler {
        Handler::new(
            Target::Storage,
            self.storage_base_url.clone(),
            None,
            Action::AcceptUnder {
                prefix: self.storage_ingestion_prefix.clone(),
                accepted: SimulatedResponse::text(STORAGE_ACCEPTED_BODY),
            },
        )
    }

    /// Any method on the analytics base URL, always forwarded
    pub fn analytics(&self) -> Handler {
        Handler::new(
            Target::Analytics,
            self.analytics_base_url.clone(),
            None,
            Action::Passthrough,
        )
    }

    /// Any method on the blob base URL, always forwarded
    pub fn blob(&self) -> Handler {
        Handler::new(
            Target::Blob,
            self.blob_base_url.clone(),
            None,
            Action::Passthrough,
        )
    }

    /// Full data scenario: completion payload plus the storage, analytics
    /// and blob handlers, in installation order
    pub fn scenario<T: Serialize>(&self, payload: &T) -> InterceptResult<Vec<Handler>> {
        Ok(vec![
            self.json_completion(payload)?,
            self.storage(),
            self.analytics(),
            self.blob(),
        ])
    }
}

/// Serialize `url` the way request URLs are serialized (lowercase scheme and
/// host, no default port), without a trailing slash
fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => sanitize_base(parsed.as_str()),
        Err(_) => sanitize_base(url),
    }
}
