//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method,
//!   status, target
//! - `gateway_request_duration_seconds` (histogram): forwarding latency
//!   by method, status, target
//! - `gateway_target_health` (gauge): 1=alive, 0=dead, per target
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one forwarded request and its latency.
pub fn record_request(method: &str, status: u16, target: &str, started: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("target", target.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
}

/// Record the latest probe outcome for one target.
pub fn record_target_health(target: &str, alive: bool) {
    let value = if alive { 1.0 } else { 0.0 };
    metrics::gauge!("gateway_target_health", "target" => target.to_string()).set(value);
}
