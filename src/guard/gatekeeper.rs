//! Connection admission.
//!
//! # Responsibilities
//! - Decide, once per connection attempt, whether the peer may talk to us
//! - Count accepted and blocked connections
//! - Close rejected connections on the spot
//!
//! # Design Decisions
//! - One shared instance for all connections, no per-connection state
//! - Only the peer address is inspected, never payload
//! - Rejection is final for the attempt: no retry, no backoff

use std::net::IpAddr;
use std::sync::Arc;

use crate::filter::FilterConfiguration;
use crate::telemetry::TelemetryCounters;

/// Terminal outcome of a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Peer may proceed; the connection is handed downstream.
    Admitted,
    /// Peer is outside every configured range; the connection is closed.
    Rejected,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Admission control against the active [`RangeSet`](crate::filter::RangeSet).
#[derive(Debug, Clone)]
pub struct ConnectionGatekeeper {
    filter: Arc<FilterConfiguration>,
    counters: Arc<TelemetryCounters>,
}

impl ConnectionGatekeeper {
    pub fn new(filter: Arc<FilterConfiguration>, counters: Arc<TelemetryCounters>) -> Self {
        Self { filter, counters }
    }

    /// Decide on a connection from `peer` and update the counters.
    pub fn on_connect(&self, peer: IpAddr) -> Admission {
        let ranges = self.filter.current();
        if !ranges.is_empty() && !ranges.accepts(&peer) {
            self.counters.record_blocked();
            tracing::debug!(peer_addr = %peer, "Connection blocked by IP filter");
            return Admission::Rejected;
        }

        self.counters.record_accepted();
        Admission::Admitted
    }

    /// Decide on `conn` and give it back only if admitted.
    ///
    /// A rejected connection is dropped here, which closes it synchronously;
    /// nothing is left waiting on the close.
    pub fn admit<C>(&self, peer: IpAddr, conn: C) -> Option<C> {
        match self.on_connect(peer) {
            Admission::Admitted => Some(conn),
            Admission::Rejected => {
                drop(conn);
                None
            }
        }
    }

    pub fn filter(&self) -> &Arc<FilterConfiguration> {
        &self.filter
    }
}
