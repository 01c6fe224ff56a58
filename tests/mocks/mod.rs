//! Mock infrastructure standing in for real backing services
//!
//! Passthrough and bypass tests need something real on the other side of the
//! network. These wiremock servers play the analytics store, the blob store
//! and the upstream chat-completion API.

#![allow(dead_code)]

pub mod backend;

// Only the integration target imports through the re-export
#[allow(unused_imports)]
pub use backend::*;
