//! Metrics collection and exposition.
//!
//! # Metrics
//! - `front_door_requests_total` (counter): requests by method, status, decision
//! - `front_door_request_duration_seconds` (histogram): latency by decision
//! - `front_door_upstream_errors_total` (counter): failed exchanges by kind
//! - `front_door_redirects_resolved_total` (counter): trailing-slash redirects followed
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter is opt-in via config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

fn describe_metrics() {
    describe_counter!("front_door_requests_total", "Total inbound requests");
    describe_histogram!(
        "front_door_request_duration_seconds",
        "Time from request receipt to response headers"
    );
    describe_counter!("front_door_upstream_errors_total", "Failed upstream exchanges");
    describe_counter!(
        "front_door_redirects_resolved_total",
        "Trailing-slash redirects resolved internally"
    );
}

pub fn record_request(method: &str, status: u16, decision: &'static str, start: Instant) {
    counter!(
        "front_door_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "decision" => decision
    )
    .increment(1);
    histogram!("front_door_request_duration_seconds", "decision" => decision)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(kind: &'static str) {
    counter!("front_door_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_redirect_resolved() {
    counter!("front_door_redirects_resolved_total").increment(1);
}
