//! Logging and metrics
//!
//! Counters go through the `metrics` facade; without an installed recorder
//! they are no-ops.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for test runs.
///
/// Honors `RUST_LOG`, defaulting to `interceptor=info`. Safe to call from
/// every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "interceptor=info".into()),
        )
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Describe the harness metrics to the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        "interceptor_requests_total",
        "Total number of outgoing requests seen by the harness"
    );
    metrics::describe_counter!(
        "interceptor_handlers_installed_total",
        "Total number of handlers installed"
    );
}

/// Record one intercepted request
pub fn record_interception(target: &str, outcome: &str) {
    metrics::counter!(
        "interceptor_requests_total",
        "target" => target.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record an installed handler
pub fn record_handler_installed(target: &str) {
    metrics::counter!("interceptor_handlers_installed_total", "target" => target.to_string())
        .increment(1);
}
