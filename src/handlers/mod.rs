//! Handlers and the handler stack
//!
//! A [`Handler`] pairs one of the fixed [`Target`]s with an [`Action`]. The
//! target decides whether a request matches; the action decides what happens
//! to it. [`HandlerFactory`] builds handlers for the configured base URLs and
//! [`HandlerStack`] keeps them in installation order.

pub mod factory;
pub mod stack;

use reqwest::{Method, Url};

use crate::error::{InterceptError, InterceptResult};
use crate::fixtures::SimulatedResponse;

pub use factory::HandlerFactory;
pub use stack::HandlerStack;

/// External services the harness knows how to intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    ChatCompletion,
    Storage,
    Analytics,
    Blob,
}

impl Target {
    pub const ALL: [Target; 4] = [
        Target::ChatCompletion,
        Target::Storage,
        Target::Analytics,
        Target::Blob,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::ChatCompletion => "chat_completion",
            Target::Storage => "storage",
            Target::Analytics => "analytics",
            Target::Blob => "blob",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a matching handler does with a request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Answer with a simulated response
    Respond(SimulatedResponse),
    /// Forward the request unchanged
    Passthrough,
    /// Accept uploads under the prefix, reject any other path
    AcceptUnder {
        prefix: String,
        accepted: SimulatedResponse,
    },
}

/// Decision for a single matched request
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Respond(SimulatedResponse),
    Passthrough,
}

/// Immutable predicate + action pair
#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    target: Target,
    /// Exact URL for the completion target, base URL otherwise
    url: String,
    method: Option<Method>,
    action: Action,
}

impl Handler {
    pub(crate) fn new(target: Target, url: String, method: Option<Method>, action: Action) -> Self {
        Self {
            target,
            url,
            method,
            action,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Check whether this handler applies to the request
    pub fn matches(&self, method: &Method, url: &Url) -> bool {
        if let Some(expected) = &self.method {
            if expected != method {
                return false;
            }
        }

        match self.target {
            // Query strings do not take part in endpoint matching
            Target::ChatCompletion => without_query(url) == self.url,
            Target::Storage | Target::Analytics | Target::Blob => {
                remainder(url.as_str(), &self.url).is_some()
            }
        }
    }

    /// Decide what to do with a request this handler matched
    pub fn resolve(&self, url: &Url) -> InterceptResult<Resolution> {
        match &self.action {
            Action::Respond(response) => Ok(Resolution::Respond(response.clone())),
            Action::Passthrough => Ok(Resolution::Passthrough),
            Action::AcceptUnder { prefix, accepted } => {
                let path = remainder(url.as_str(), &self.url)
                    .map(|rest| rest.split(['?', '#']).next().unwrap_or_default())
                    .unwrap_or_default();

                if path.starts_with(prefix.as_str()) {
                    Ok(Resolution::Respond(accepted.clone()))
                } else {
                    Err(InterceptError::UnexpectedPath {
                        url: url.to_string(),
                        path: path.to_string(),
                    })
                }
            }
        }
    }
}

/// Part of `url` after `base`, if `url` lives under `base`
fn remainder<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let rest = url.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
        Some(rest)
    } else {
        None
    }
}

fn without_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}
