//! Interceptor - network interception harness for tests
//!
//! Simulates the external HTTP services a system under test talks to: a
//! chat-completion API, an object-storage ingestion endpoint, an analytics
//! store and a blob store. Tests install fixtures on an
//! [`InterceptionServer`], send traffic through the [`InterceptingClient`] it
//! hands out, and reset or tear down the server at test boundaries.

pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod observer;
pub mod server;
pub mod telemetry;

pub use crate::client::{HttpResponse, InterceptingClient, OutgoingRequest};
pub use crate::config::{Config, ServerConfig};
pub use crate::error::{ClientError, InterceptError, InterceptResult};
pub use crate::fixtures::{default_completion, ChatCompletion, SimulatedResponse, Usage};
pub use crate::handlers::{Handler, HandlerFactory, HandlerStack, Target};
pub use crate::observer::{BypassEvent, BypassObserver};
pub use crate::server::{Interception, InterceptionServer, Lifecycle, Outcome, RecordedRequest};
pub use crate::telemetry::init_tracing;
