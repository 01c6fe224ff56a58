//! Response generators
//!
//! Pure constructors for every simulated outcome the harness can deliver:
//! - [`SimulatedResponse::json`] / [`SimulatedResponse::text`] - success payloads
//! - [`SimulatedResponse::http_error`] - an HTTP status with an empty body
//! - [`SimulatedResponse::network_failure`] - a connection that never completes
//!
//! [`completion`] holds the chat-completion payload types and the canonical
//! default fixture.

pub mod completion;
pub mod responses;

pub use completion::{default_completion, ChatCompletion, Usage};
pub use responses::SimulatedResponse;
