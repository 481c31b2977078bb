//! Periodic counter reporting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::filter::FilterConfiguration;
use crate::observability::metrics;
use crate::telemetry::TelemetryCounters;

/// Publish and log the counters every `interval` until shutdown.
pub async fn run_reporter(
    counters: Arc<TelemetryCounters>,
    filter: Arc<FilterConfiguration>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => report(&counters, &filter),
            _ = shutdown.recv() => break,
        }
    }

    report(&counters, &filter);
}

fn report(counters: &TelemetryCounters, filter: &FilterConfiguration) {
    let snapshot = counters.snapshot();
    let ranges = filter.current().len();
    metrics::publish(&snapshot, ranges);
    tracing::info!(
        connections_accepted = snapshot.connections_accepted,
        connections_blocked = snapshot.connections_blocked,
        bytes_in = snapshot.bytes_in,
        bytes_out = snapshot.bytes_out,
        messages_in = snapshot.messages_in,
        messages_out = snapshot.messages_out,
        filter_ranges = ranges,
        "Traffic counters"
    );
}
