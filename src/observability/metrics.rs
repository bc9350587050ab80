//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by endpoint, status
//! - `proxy_request_duration_seconds` (histogram): handler latency by endpoint
//! - `proxy_upstream_requests_total` (counter): upstream calls by operation, outcome
//! - `proxy_upstream_duration_seconds` (histogram): upstream latency by operation
//!
//! Recording is a no-op until a recorder is installed, so tests and the
//! metrics-disabled configuration need no special casing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "proxy_request_duration_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "proxy_upstream_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("proxy_upstream_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
