//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by role, status
//! - `balancer_request_duration_seconds` (histogram): end-to-end latency by role
//! - `balancer_backend_served_total` (counter): dispatches per backend
//! - `balancer_backend_alive` (gauge): 1=alive, 0=down

use std::net::SocketAddr;
use std::time::Instant;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(role: &str, status: u16, start: Instant) {
    counter!(
        "balancer_requests_total",
        "role" => role.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "role" => role.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch(backend: &str) {
    counter!("balancer_backend_served_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_alive(backend: &str, alive: bool) {
    gauge!("balancer_backend_alive", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
