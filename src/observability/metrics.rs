//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by resource, method, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_upstream_failures_total` (counter): network failures and aborts
//! - `form_dependent_failures_total` (counter): edits dropped after their photo succeeded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(resource: &str, method: &str, status: u16, start: Instant) {
    let labels = [
        ("resource", resource.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(resource: &str, aborted: bool) {
    let kind = if aborted { "abort" } else { "network" };
    counter!(
        "gateway_upstream_failures_total",
        "resource" => resource.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_dependent_failure() {
    counter!("form_dependent_failures_total").increment(1);
}
