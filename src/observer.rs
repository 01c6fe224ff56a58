//! Bypass observer
//!
//! A single callback slot notified when an unmatched request was allowed to
//! reach the real network. Only permissive servers carry one. The callback
//! sees the response by reference and cannot alter what the caller receives.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, Url};
use tracing::info;

use crate::client::HttpResponse;

/// A request that bypassed interception, with the real response it got
#[derive(Debug, Clone, Copy)]
pub struct BypassEvent<'a> {
    pub method: &'a Method,
    pub url: &'a Url,
    pub response: &'a HttpResponse,
}

type Callback = dyn Fn(&BypassEvent<'_>) + Send + Sync;

/// Callback invoked for every bypassed response
#[derive(Clone)]
pub struct BypassObserver {
    callback: Arc<Callback>,
}

impl BypassObserver {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&BypassEvent<'_>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Observer that logs every bypassed response
    pub fn logging() -> Self {
        Self::new(|event| {
            info!(
                method = %event.method,
                url = %event.url,
                status = %event.response.status,
                body_len = event.response.body.len(),
                "Request bypassed interception"
            );
        })
    }

    pub(crate) fn notify(&self, event: &BypassEvent<'_>) {
        (self.callback)(event);
    }
}

impl fmt::Debug for BypassObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BypassObserver").finish_non_exhaustive()
    }
}
