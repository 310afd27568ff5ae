//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mockservice_requests_total` (counter): requests by outcome, status
//! - `mockservice_request_duration_seconds` (histogram): time to respond,
//!   including the artificial delay
//! - `mockservice_hot_loads_total` (counter): hot reloads by scope
//! - `mockservice_cold_services` / `mockservice_hot_services` (gauge)
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs an exporter
//! - Labels are low-cardinality: no service keys

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one answered request.
pub fn record_dispatch(outcome: &'static str, status: u16, start: Instant) {
    counter!("mockservice_requests_total", "outcome" => outcome, "status" => status.to_string())
        .increment(1);
    histogram!("mockservice_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a hot reload; `scope` is `"global"` or `"project"`.
pub fn record_hot_load(scope: &'static str) {
    counter!("mockservice_hot_loads_total", "scope" => scope).increment(1);
}

pub fn record_table_sizes(cold: usize, hot: usize) {
    gauge!("mockservice_cold_services").set(cold as f64);
    gauge!("mockservice_hot_services").set(hot as f64);
}
