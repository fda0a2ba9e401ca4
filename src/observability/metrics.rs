//! Metrics collection and exposition.
//!
//! # Metrics
//! - `filter_invocations_total` (counter): filter invocations by filter name
//! - `filter_rejections_total` (counter): chain halts by filter name and status
//! - `csrf_decisions_total` (counter): nonce checks by decision
//! - `csrf_nonces_issued_total` (counter): nonces added to session caches

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_filter_invocation(filter: &str) {
    counter!("filter_invocations_total", "filter" => filter.to_string()).increment(1);
}

pub fn record_rejection(filter: &str, status: u16) {
    counter!(
        "filter_rejections_total",
        "filter" => filter.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_csrf_decision(decision: &'static str) {
    counter!("csrf_decisions_total", "decision" => decision).increment(1);
}

pub fn record_nonce_issued() {
    counter!("csrf_nonces_issued_total").increment(1);
}
