//! Per-connection byte accounting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives the byte counts of one connection.
///
/// Implemented by whatever layer owns the connection's bookkeeping; the
/// interceptor only forwards counts to it.
pub trait AccountingSink: Send + Sync {
    fn record_inbound(&self, bytes: u64);
    fn record_outbound(&self, bytes: u64);
}

/// Default sink: running byte totals for a single connection.
#[derive(Debug, Default)]
pub struct ConnectionAccounting {
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
}

impl ConnectionAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in.load(Ordering::Relaxed)
    }

    pub fn bytes_out(&self) -> u64 {
        self.bytes_out.load(Ordering::Relaxed)
    }
}

impl AccountingSink for ConnectionAccounting {
    fn record_inbound(&self, bytes: u64) {
        self.bytes_in.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_outbound(&self, bytes: u64) {
        self.bytes_out.fetch_add(bytes, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let acct = ConnectionAccounting::new();
        acct.record_inbound(100);
        acct.record_inbound(28);
        acct.record_outbound(7);
        assert_eq!(acct.bytes_in(), 128);
        assert_eq!(acct.bytes_out(), 7);
    }
}
