//! Processing client metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host application installs a recorder.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total capability requests by capability and outcome.
    pub const REQUESTS_TOTAL: &str = "image_toolbox_requests_total";

    /// Request latency in seconds by capability.
    pub const LATENCY_SECONDS: &str = "image_toolbox_request_latency_seconds";
}

/// Record a completed capability request.
///
/// `outcome` is `"ok"` or an error kind such as `"server_error"`.
pub fn record_request(capability: &str, outcome: &'static str, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "capability" => capability.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "capability" => capability.to_string()
    )
    .record(latency_ms / 1000.0);
}
