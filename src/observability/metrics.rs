//! Metrics exposition.
//!
//! # Metrics
//! - `guard_connections_accepted` (gauge)
//! - `guard_connections_blocked` (gauge)
//! - `guard_bytes_in` / `guard_bytes_out` (gauge)
//! - `guard_messages_in` / `guard_messages_out` (gauge)
//! - `guard_filter_ranges` (gauge): size of the active range set
//!
//! Gauges rather than counters: the source values can be reset (admin reset,
//! clamp-on-overflow), which a Prometheus counter must never do.

use std::net::SocketAddr;

use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::telemetry::TelemetrySnapshot;

/// Install the Prometheus exporter on `addr`. Requires a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn describe() {
    describe_gauge!("guard_connections_accepted", "Connections admitted by the IP filter");
    describe_gauge!("guard_connections_blocked", "Connections rejected by the IP filter");
    describe_gauge!("guard_bytes_in", "Bytes received from admitted peers");
    describe_gauge!("guard_bytes_out", "Bytes written to admitted peers");
    describe_gauge!("guard_messages_in", "Chunks received from admitted peers");
    describe_gauge!("guard_messages_out", "Chunks written to admitted peers");
    describe_gauge!("guard_filter_ranges", "Ranges in the active IP filter");
}

/// Mirror a counter snapshot into the gauges.
pub fn publish(snapshot: &TelemetrySnapshot, filter_ranges: usize) {
    gauge!("guard_connections_accepted").set(snapshot.connections_accepted as f64);
    gauge!("guard_connections_blocked").set(snapshot.connections_blocked as f64);
    gauge!("guard_bytes_in").set(snapshot.bytes_in as f64);
    gauge!("guard_bytes_out").set(snapshot.bytes_out as f64);
    gauge!("guard_messages_in").set(snapshot.messages_in as f64);
    gauge!("guard_messages_out").set(snapshot.messages_out as f64);
    gauge!("guard_filter_ranges").set(filter_ranges as f64);
}
