//! Metrics collection and exposition.
//!
//! # Metrics
//! - `metaphor_requests_total` (counter): requests by route, method, status
//! - `metaphor_request_duration_seconds` (histogram): latency distribution
//! - `metaphor_simulated_delay_ms` (histogram): delays drawn by `/performance`
//! - `metaphor_kill_switch_total` (counter): scheduled terminations
//!
//! Without an installed recorder every macro is a no-op, so tests and
//! disabled deployments pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::TelemetryError;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), TelemetryError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("metaphor_requests_total", &labels).increment(1);
    histogram!("metaphor_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_simulated_delay(delay_ms: u64) {
    histogram!("metaphor_simulated_delay_ms").record(delay_ms as f64);
}

pub fn record_kill_scheduled() {
    counter!("metaphor_kill_switch_total").increment(1);
}

/// Middleware recording one counter and one latency sample per request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;

    record_request(&route, &method, response.status().as_u16(), start);
    response
}
