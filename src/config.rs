//! Configuration management for the interception harness
//!
//! Target base URLs are loaded from environment variables. The harness mode
//! (strict vs permissive, default scenario) lives in [`ServerConfig`] and is
//! fixed for the lifetime of a server instance.

use anyhow::{Context, Result};
use std::env;

/// Default chat-completion API base URL
pub const DEFAULT_COMPLETION_API_URL: &str = "https://api.openai.com/v1";
/// Default object-storage base URL
pub const DEFAULT_STORAGE_BASE_URL: &str = "http://localhost:9090";
/// Default analytics store base URL
pub const DEFAULT_ANALYTICS_BASE_URL: &str = "http://localhost:8123";
/// Default blob store base URL
pub const DEFAULT_BLOB_BASE_URL: &str = "http://localhost:10000";
/// Path prefix the storage target accepts uploads under
pub const DEFAULT_STORAGE_INGESTION_PREFIX: &str = "/langfuse/events/";

/// Path of the chat-completion endpoint, relative to the completion API base
pub const COMPLETION_PATH: &str = "/chat/completions";

/// Target configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat-completion API base URL (without the completion path)
    pub completion_api_url: String,
    /// Object-storage base URL
    pub storage_base_url: String,
    /// Analytics store base URL
    pub analytics_base_url: String,
    /// Blob store base URL
    pub blob_base_url: String,
    /// Path prefix storage requests must start with
    pub storage_ingestion_prefix: String,

    /// Let unmatched requests reach the real network
    pub has_active_key: bool,
    /// Install the default completion fixture at construction
    pub use_default_response: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion_api_url: DEFAULT_COMPLETION_API_URL.to_string(),
            storage_base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
            analytics_base_url: DEFAULT_ANALYTICS_BASE_URL.to_string(),
            blob_base_url: DEFAULT_BLOB_BASE_URL.to_string(),
            storage_ingestion_prefix: DEFAULT_STORAGE_INGESTION_PREFIX.to_string(),
            has_active_key: false,
            use_default_response: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            completion_api_url: sanitize_base(
                &env::var("OPENAI_API_URL")
                    .unwrap_or_else(|_| DEFAULT_COMPLETION_API_URL.to_string()),
            ),
            storage_base_url: sanitize_base(
                &env::var("MINIO_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_STORAGE_BASE_URL.to_string()),
            ),
            analytics_base_url: sanitize_base(
                &env::var("CLICKHOUSE_HTTP_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_ANALYTICS_BASE_URL.to_string()),
            ),
            blob_base_url: sanitize_base(
                &env::var("AZURITE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BLOB_BASE_URL.to_string()),
            ),
            storage_ingestion_prefix: env::var("STORAGE_INGESTION_PREFIX")
                .unwrap_or_else(|_| DEFAULT_STORAGE_INGESTION_PREFIX.to_string()),

            has_active_key: parse_flag("INTERCEPTOR_HAS_ACTIVE_KEY")?,
            use_default_response: parse_flag("INTERCEPTOR_USE_DEFAULT_RESPONSE")?,
        })
    }

    /// Load a `.env` file if present, then read the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Full URL of the chat-completion endpoint
    pub fn completion_url(&self) -> String {
        format!("{}{}", sanitize_base(&self.completion_api_url), COMPLETION_PATH)
    }

    /// Harness mode derived from the two flags
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::from_flags(self.has_active_key, self.use_default_response)
    }
}

/// Harness mode, immutable for the lifetime of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Unmatched requests fail the test instead of reaching the network
    pub strict_unmatched: bool,
    /// Install the default completion fixture at construction
    pub install_default_scenario: bool,
}

impl ServerConfig {
    /// Build from the externally facing flags.
    ///
    /// An active API key means real calls are possible, so unmatched requests
    /// are allowed through; without one they are a test bug.
    pub fn from_flags(has_active_key: bool, use_default_response: bool) -> Self {
        Self {
            strict_unmatched: !has_active_key,
            install_default_scenario: use_default_response,
        }
    }
}

/// Strip a single trailing slash from a base URL
pub fn sanitize_base(base: &str) -> String {
    base.strip_suffix('/').unwrap_or(base).to_string()
}

fn parse_flag(name: &str) -> Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(anyhow::anyhow!("expected a boolean, got {:?}", other))
                .with_context(|| format!("Invalid {}", name)),
        },
        Err(_) => Ok(false),
    }
}
