//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trace_web_requests_total` (counter): responses by status code
//! - `trace_web_request_duration_seconds` (histogram): latency distribution
//! - `trace_web_trace_id_retries_total` (counter): extra trace-id lookups
//!   issued while resolving a search
//! - `trace_web_resource_loads_total` (counter): static asset lookups by outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels kept low-cardinality: status code and outcome only

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "trace_web_requests_total";
pub const REQUEST_DURATION: &str = "trace_web_request_duration_seconds";
pub const TRACE_ID_RETRIES: &str = "trace_web_trace_id_retries_total";
pub const RESOURCE_LOADS: &str = "trace_web_resource_loads_total";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

/// Record a completed request.
pub fn record_request(status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(REQUESTS_TOTAL, "status" => status.clone()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_trace_id_retry() {
    metrics::counter!(TRACE_ID_RETRIES).increment(1);
}

/// `outcome` is one of `hit`, `loaded`, `missing`, `rejected`.
pub fn record_resource_load(outcome: &'static str) {
    metrics::counter!(RESOURCE_LOADS, "outcome" => outcome).increment(1);
}
