//! Guard server: accept loop, admission, relay, reload.
//!
//! # Responsibilities
//! - Accept connections under the listener's connection limit
//! - Run every attempt through the gatekeeper before anything else
//! - Relay admitted connections to the upstream, metered
//! - Apply filter reloads from the config watcher
//! - Stop on shutdown and drain open connections

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::config::GuardConfig;
use crate::filter::{FilterConfiguration, RangeSet};
use crate::guard::{ConnectionGatekeeper, TrafficInterceptor};
use crate::net::{ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::relay::upstream::Upstream;
use crate::telemetry::TelemetryCounters;

/// How long shutdown waits for open relays.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepting pauses this long after a failed accept (e.g. out of file descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The front-of-pipeline guard.
pub struct GuardServer {
    filter: Arc<FilterConfiguration>,
    gatekeeper: ConnectionGatekeeper,
    upstream: Arc<Upstream>,
    tracker: ConnectionTracker,
}

impl GuardServer {
    /// Create a server sharing `filter` and `counters` with the rest of the process.
    pub fn new(
        config: &GuardConfig,
        filter: Arc<FilterConfiguration>,
        counters: Arc<TelemetryCounters>,
    ) -> Self {
        let gatekeeper = ConnectionGatekeeper::new(Arc::clone(&filter), Arc::clone(&counters));
        let interceptor = Arc::new(TrafficInterceptor::new(counters));
        let upstream = Arc::new(Upstream::new(
            config.upstream.address.clone(),
            Duration::from_secs(config.upstream.connect_timeout_secs),
            interceptor,
        ));

        Self {
            filter,
            gatekeeper,
            upstream,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Run until `shutdown` fires, swapping in range sets from `filter_updates`.
    pub async fn run(
        self,
        listener: Listener,
        mut filter_updates: mpsc::UnboundedReceiver<RangeSet>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.upstream.address(),
            filter_ranges = self.filter.current().len(),
            "Guard server starting"
        );

        let mut resume_accept_at: Option<Instant> = None;
        loop {
            tokio::select! {
                accepted = listener.accept(), if resume_accept_at.is_none() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let _ = stream.set_nodelay(true);
                        // A dual-stack socket reports IPv4 peers as ::ffff:a.b.c.d
                        self.handle(stream, peer.ip().to_canonical(), permit);
                    }
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        resume_accept_at = Some(Instant::now() + ACCEPT_ERROR_BACKOFF);
                    }
                },
                _ = tokio::time::sleep_until(resume_accept_at.unwrap_or_else(Instant::now)),
                    if resume_accept_at.is_some() => resume_accept_at = None,
                Some(ranges) = filter_updates.recv() => {
                    self.filter.replace(ranges);
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!(open_connections = self.tracker.active_count(), "Guard server stopping");
        if !self.tracker.wait_for_drain(DRAIN_TIMEOUT).await {
            tracing::warn!(
                open_connections = self.tracker.active_count(),
                "Drain deadline passed, abandoning open connections"
            );
        }
        tracing::info!("Guard server stopped");
        Ok(())
    }

    fn handle(&self, stream: TcpStream, peer: IpAddr, permit: ConnectionPermit) {
        // Rejected streams are dropped (closed) inside `admit`.
        let Some(stream) = self.gatekeeper.admit(peer, stream) else {
            return;
        };

        let guard = self.tracker.track();
        tracing::trace!(connection_id = %guard.id(), peer_addr = %peer, "Connection admitted");

        let upstream = Arc::clone(&self.upstream);
        tokio::spawn(async move {
            upstream.relay(stream, guard).await;
            drop(permit);
        });
    }
}
