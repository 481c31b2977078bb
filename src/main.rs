//! Edge guard (v1)
//!
//! A TCP front for an HTTP server that admits peers by address range and
//! meters every byte exchanged with them.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                   EDGE GUARD                      │
//!                        │                                                   │
//!     Client connection  │  ┌─────────┐    ┌────────────┐   rejected         │
//!     ───────────────────┼─▶│   net   │───▶│ gatekeeper │──────────▶ close   │
//!                        │  │listener │    └─────┬──────┘                    │
//!                        │  └─────────┘          │ admitted                  │
//!                        │                       ▼                           │
//!                        │               ┌──────────────┐   ┌────────────┐   │
//!     ◀──────────────────┼──────────────▶│ MeteredStream│◀─▶│  upstream  │◀──┼──▶ HTTP
//!                        │               │ (interceptor)│   │   relay    │   │    server
//!                        │               └──────┬───────┘   └────────────┘   │
//!                        │                      ▼                            │
//!                        │   ┌──────────────────────────────────────────┐    │
//!                        │   │ telemetry counters → reporter → metrics  │    │
//!                        │   │ config watcher → FilterConfiguration      │    │
//!                        │   └──────────────────────────────────────────┘    │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use edge_guard::config::{load_config, FilterReloader, GuardConfig};
use edge_guard::filter::FilterConfiguration;
use edge_guard::lifecycle::{signals, Shutdown};
use edge_guard::net::Listener;
use edge_guard::observability::{logging, metrics};
use edge_guard::relay::GuardServer;
use edge_guard::telemetry::{run_reporter, TelemetryCounters};

#[derive(Parser)]
#[command(name = "edge-guard")]
#[command(about = "Address-range admission control and traffic telemetry for an HTTP server", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    if cli.check {
        println!("configuration OK ({} filter ranges)", config.filter.ranges.len());
        return Ok(());
    }

    logging::init(&config.observability.log_level, config.observability.log_format);
    tracing::info!("edge-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        upstream = %config.upstream.address,
        filter_ranges = config.filter.ranges.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let filter = Arc::new(FilterConfiguration::new(config.filter.range_set()?));
    let counters = Arc::new(TelemetryCounters::new());
    let shutdown = Shutdown::new();

    // Keep the watcher alive for the life of the process.
    let (_watcher, filter_updates) = match &cli.config {
        Some(path) => match FilterReloader::new(path, &config).watch() {
            Ok((watcher, updates)) => (Some(watcher), updates),
            Err(e) => {
                tracing::error!(error = %e, "Config watcher failed to start, hot reload disabled");
                (None, mpsc::unbounded_channel().1)
            }
        },
        None => (None, mpsc::unbounded_channel().1),
    };

    if config.observability.report_interval_secs > 0 {
        tokio::spawn(run_reporter(
            Arc::clone(&counters),
            Arc::clone(&filter),
            Duration::from_secs(config.observability.report_interval_secs),
            shutdown.subscribe(),
        ));
    }

    let listener = Listener::bind(&config.listener).await?;
    let server = GuardServer::new(&config, filter, counters);
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, filter_updates, server_shutdown));

    signals::wait_for_termination().await;
    shutdown.trigger();

    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
