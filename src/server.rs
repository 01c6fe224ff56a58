//! Interception server
//!
//! Owns the handler stack and the lifecycle. Every test should own its own
//! instance; the lock inside only exists so the server and the clients it
//! hands out can see the same stack, and is never held across an await.
//!
//! # Example
//!
//! ```rust,ignore
//! let server = InterceptionServer::new(&Config::default())?;
//! server.setup()?;
//! server.respond_with_error(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")?;
//!
//! let client = server.client();
//! let response = client.post_json(completion_url, &request).await?;
//! assert_eq!(response.status_text, "Server Error");
//!
//! server.reset()?;
//! server.teardown();
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::client::{HttpResponse, InterceptingClient};
use crate::config::{Config, ServerConfig};
use crate::error::{InterceptError, InterceptResult};
use crate::fixtures::{default_completion, SimulatedResponse};
use crate::handlers::{Handler, HandlerFactory, HandlerStack, Resolution, Target};
use crate::observer::{BypassEvent, BypassObserver};
use crate::telemetry::{describe_metrics, record_handler_installed, record_interception};

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Listening,
    Closed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Listening => "listening",
            Lifecycle::Closed => "closed",
        })
    }
}

/// What the client must do with an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// Deliver a simulated response
    Respond(SimulatedResponse),
    /// A handler asked for the real request to go through
    Passthrough,
    /// Nothing matched and the server is permissive
    Bypass,
}

/// How the harness handled a recorded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Responded,
    NetworkFailure,
    Passthrough,
    Bypassed,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Responded => "responded",
            Outcome::NetworkFailure => "network_failure",
            Outcome::Passthrough => "passthrough",
            Outcome::Bypassed => "bypassed",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Journal entry for a request seen while listening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// `None` when no handler matched
    pub target: Option<Target>,
    pub method: Method,
    pub url: Url,
    pub outcome: Outcome,
}

#[derive(Debug)]
struct Registry {
    lifecycle: Lifecycle,
    stack: HandlerStack,
    journal: Vec<RecordedRequest>,
    failures: Vec<InterceptError>,
    observer: Option<BypassObserver>,
}

/// State shared between a server and its clients
#[derive(Debug)]
pub(crate) struct Shared {
    strict_unmatched: bool,
    registry: RwLock<Registry>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Match a request against the stack and record the decision
    pub(crate) fn intercept(&self, method: &Method, url: &Url) -> InterceptResult<Interception> {
        let mut registry = self.write();

        if registry.lifecycle != Lifecycle::Listening {
            return Err(InterceptError::Lifecycle {
                operation: "intercept",
                state: registry.lifecycle,
            });
        }

        let decision = match registry.stack.find(method, url) {
            Some(handler) => {
                let target = handler.target();
                debug!(target_name = %target, method = %method, url = %url, "Handler matched");
                (Some(target), handler.resolve(url))
            }
            None if self.strict_unmatched => (
                None,
                Err(InterceptError::UnmatchedRequest {
                    method: method.clone(),
                    url: url.to_string(),
                }),
            ),
            None => {
                warn!(method = %method, url = %url, "No handler matched, bypassing interception");
                (None, Ok(Resolution::Passthrough))
            }
        };

        let (target, result) = decision;
        if let Ok(Resolution::Respond(response)) = &result {
            debug!(url = %url, response = response.kind(), "Serving simulated response");
        }

        let (interception, outcome) = match result {
            Ok(Resolution::Respond(SimulatedResponse::NetworkFailure)) => (
                Ok(Interception::Respond(SimulatedResponse::NetworkFailure)),
                Outcome::NetworkFailure,
            ),
            Ok(Resolution::Respond(response)) => {
                (Ok(Interception::Respond(response)), Outcome::Responded)
            }
            Ok(Resolution::Passthrough) if target.is_none() => {
                (Ok(Interception::Bypass), Outcome::Bypassed)
            }
            Ok(Resolution::Passthrough) => (Ok(Interception::Passthrough), Outcome::Passthrough),
            Err(err) => {
                error!(method = %method, url = %url, error = %err, "Request rejected by interceptor");
                registry.failures.push(err.clone());
                (Err(err), Outcome::Rejected)
            }
        };

        registry.journal.push(RecordedRequest {
            target,
            method: method.clone(),
            url: url.clone(),
            outcome,
        });
        record_interception(
            target.map(|t| t.as_str()).unwrap_or("unmatched"),
            outcome.as_str(),
        );

        interception
    }

    /// Hand a bypassed response to the observer, if one is installed
    pub(crate) fn notify_bypass(&self, method: &Method, url: &Url, response: &HttpResponse) {
        // Clone out of the lock so the callback runs unlocked
        let observer = self.read().observer.clone();
        if let Some(observer) = observer {
            observer.notify(&BypassEvent {
                method,
                url,
                response,
            });
        }
    }
}

/// Configurable interception harness for one test (or test worker)
#[derive(Debug)]
pub struct InterceptionServer {
    config: ServerConfig,
    factory: HandlerFactory,
    http: reqwest::Client,
    shared: Arc<Shared>,
}

impl InterceptionServer {
    /// Create a server for the targets and flags in `config`
    pub fn new(config: &Config) -> InterceptResult<Self> {
        Self::with_server_config(config, config.server_config())
    }

    /// Create a server with an explicit mode
    pub fn with_server_config(config: &Config, server_config: ServerConfig) -> InterceptResult<Self> {
        info!(
            strict_unmatched = server_config.strict_unmatched,
            install_default_scenario = server_config.install_default_scenario,
            "Creating interception server"
        );

        describe_metrics();
        let factory = HandlerFactory::new(config);

        let baseline = if server_config.install_default_scenario {
            vec![factory.json_completion(&default_completion())?]
        } else {
            Vec::new()
        };
        for handler in &baseline {
            record_handler_installed(handler.target().as_str());
        }

        let observer = (!server_config.strict_unmatched).then(BypassObserver::logging);

        Ok(Self {
            config: server_config,
            factory,
            http: reqwest::Client::new(),
            shared: Arc::new(Shared {
                strict_unmatched: server_config.strict_unmatched,
                registry: RwLock::new(Registry {
                    lifecycle: Lifecycle::Uninitialized,
                    stack: HandlerStack::with_baseline(baseline),
                    journal: Vec::new(),
                    failures: Vec::new(),
                    observer,
                }),
            }),
        })
    }

    /// Replace the bypass observer.
    ///
    /// Strict servers never bypass, so the observer is dropped with a warning.
    pub fn with_bypass_observer(self, observer: BypassObserver) -> Self {
        if self.config.strict_unmatched {
            warn!("Ignoring bypass observer on a strict interception server");
        } else {
            self.shared.write().observer = Some(observer);
        }
        self
    }

    /// Use a specific HTTP client for passthrough traffic
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn server_config(&self) -> ServerConfig {
        self.config
    }

    pub fn factory(&self) -> &HandlerFactory {
        &self.factory
    }

    pub fn state(&self) -> Lifecycle {
        self.shared.read().lifecycle
    }

    /// Start intercepting outgoing requests
    pub fn setup(&self) -> InterceptResult<()> {
        let mut registry = self.shared.write();
        if registry.lifecycle != Lifecycle::Uninitialized {
            return Err(InterceptError::Lifecycle {
                operation: "setup",
                state: registry.lifecycle,
            });
        }

        registry.lifecycle = Lifecycle::Listening;
        info!(
            on_unhandled = if self.config.strict_unmatched { "error" } else { "bypass" },
            "Interception server listening"
        );
        Ok(())
    }

    /// Install a completion payload plus the storage, analytics and blob handlers
    pub fn respond_with_data<T: Serialize>(&self, payload: &T) -> InterceptResult<()> {
        let handlers = self.factory.scenario(payload)?;
        self.install("respond_with_data", handlers)
    }

    /// [`respond_with_data`](Self::respond_with_data) with the default fixture
    pub fn respond_with_default(&self) -> InterceptResult<()> {
        self.respond_with_data(&default_completion())
    }

    /// Answer completion requests with an HTTP error and no body
    pub fn respond_with_error(
        &self,
        status: StatusCode,
        status_text: impl Into<String>,
    ) -> InterceptResult<()> {
        let handler = self
            .factory
            .completion(SimulatedResponse::http_error(status, status_text));
        self.install("respond_with_error", [handler])
    }

    /// Fail completion requests at the connection level
    pub fn respond_with_network_error(&self) -> InterceptResult<()> {
        let handler = self.factory.completion(SimulatedResponse::network_failure());
        self.install("respond_with_network_error", [handler])
    }

    /// Install arbitrary handlers on top of the stack
    pub fn use_handlers(&self, handlers: impl IntoIterator<Item = Handler>) -> InterceptResult<()> {
        self.install("use_handlers", handlers)
    }

    /// Drop every installed override and forget recorded requests
    pub fn reset(&self) -> InterceptResult<()> {
        let mut registry = self.listening("reset")?;
        registry.stack.reset();
        registry.journal.clear();
        registry.failures.clear();
        debug!("Handler stack reset");
        Ok(())
    }

    /// Stop intercepting and release all handlers. Calling it again is a no-op.
    pub fn teardown(&self) {
        let mut registry = self.shared.write();
        if registry.lifecycle == Lifecycle::Closed {
            return;
        }

        for failure in &registry.failures {
            error!(error = %failure, "Unreported interception failure at teardown");
        }

        registry.lifecycle = Lifecycle::Closed;
        registry.stack.clear();
        registry.observer = None;
        info!(
            requests = registry.journal.len(),
            "Interception server closed"
        );
    }

    /// Fail if any request was rejected since the last reset
    pub fn verify(&self) -> InterceptResult<()> {
        match self.shared.read().failures.first() {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    /// Requests seen since the last reset, oldest first
    pub fn received_requests(&self) -> Vec<RecordedRequest> {
        self.shared.read().journal.clone()
    }

    /// Resolve a request against the stack without sending anything
    pub fn intercept(&self, method: &Method, url: &Url) -> InterceptResult<Interception> {
        self.shared.intercept(method, url)
    }

    /// HTTP client whose requests go through this server
    pub fn client(&self) -> InterceptingClient {
        InterceptingClient::new(self.shared.clone(), self.http.clone())
    }

    fn listening(&self, operation: &'static str) -> InterceptResult<RwLockWriteGuard<'_, Registry>> {
        let registry = self.shared.write();
        if registry.lifecycle != Lifecycle::Listening {
            return Err(InterceptError::Lifecycle {
                operation,
                state: registry.lifecycle,
            });
        }
        Ok(registry)
    }

    fn install(
        &self,
        operation: &'static str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> InterceptResult<()> {
        let mut registry = self.listening(operation)?;
        let handlers: Vec<Handler> = handlers.into_iter().collect();

        for handler in &handlers {
            record_handler_installed(handler.target().as_str());
        }
        debug!(operation, count = handlers.len(), "Installing handlers");
        registry.stack.push(handlers);
        Ok(())
    }
}

impl Drop for InterceptionServer {
    fn drop(&mut self) {
        self.teardown();
    }
}
