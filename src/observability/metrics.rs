//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by route and status
//! - `proxy_request_duration_seconds` (histogram): handler latency
//! - `proxy_upstream_requests_total` (counter): upstream calls by status
//! - `proxy_upstream_duration_seconds` (histogram): upstream latency
//! - `proxy_upstream_failures_total` (counter): transport-level failures
//! - `proxy_policy_rejections_total` (counter): gate rejections by code
//! - `proxy_rate_limited_total` (counter): rate-limiter rejections
//! - `proxy_issued_keys` (gauge): tokens currently issued

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxy request.
pub fn record_request(route: &'static str, status: u16, started: Instant) {
    counter!(
        "proxy_requests_total",
        "route" => route,
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route)
        .record(started.elapsed().as_secs_f64());
}

/// Record an upstream call and its latency.
pub fn record_upstream_request(status: u16, started: Instant) {
    counter!("proxy_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("proxy_upstream_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record an upstream transport failure (connect error, timeout).
pub fn record_upstream_failure() {
    counter!("proxy_upstream_failures_total").increment(1);
}

/// Record a security-gate rejection.
pub fn record_policy_rejection(code: &'static str) {
    counter!("proxy_policy_rejections_total", "code" => code).increment(1);
}

/// Record a rate-limiter rejection.
pub fn record_rate_limited() {
    counter!("proxy_rate_limited_total").increment(1);
}

/// Track the number of issued proxy keys.
pub fn record_issued_keys(count: usize) {
    gauge!("proxy_issued_keys").set(count as f64);
}
