//! Metrics collection and exposition.
//!
//! # Metrics
//! - `scout_batches_total` (counter): non-empty batches forwarded by discovery
//! - `scout_collections_fetched_total` (counter): collections discovered
//! - `scout_fetch_failures_total` (counter): upstream failures by stage
//! - `scout_selected_total` (counter): items emitted by selection
//! - `scout_selection_failures_total` (counter): collections dropped by kind
//! - `scout_submissions_total` (counter): submission outcomes
//! - `scout_audit_errors_total` (counter): audit records written by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_batch(collections: usize) {
    counter!("scout_batches_total").increment(1);
    counter!("scout_collections_fetched_total").increment(collections as u64);
}

pub fn record_fetch_failure(stage: &'static str) {
    counter!("scout_fetch_failures_total", "stage" => stage).increment(1);
}

pub fn record_selected() {
    counter!("scout_selected_total").increment(1);
}

pub fn record_selection_failure(kind: &'static str) {
    counter!("scout_selection_failures_total", "kind" => kind).increment(1);
}

/// Outcome is one of `submitted`, `duplicate` or `failed`.
pub fn record_submission(outcome: &'static str) {
    counter!("scout_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_audit_error(kind: &'static str) {
    counter!("scout_audit_errors_total", "kind" => kind).increment(1);
}
