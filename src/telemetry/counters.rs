//! Traffic counters shared by every connection.
//!
//! # Counters
//! - connections accepted / blocked
//! - bytes in / out
//! - messages (chunks) in / out
//!
//! # Design Decisions
//! - Signed 64-bit atomics updated with a CAS loop, so concurrent increments
//!   are never lost
//! - Clamp-on-overflow: an increment that would wrap negative resets the
//!   counter to 0; a reader never sees a negative value
//! - Reset only at restart or through [`TelemetryCounters::reset`]

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

/// A single non-negative counter with clamp-on-overflow.
#[derive(Debug, Default)]
pub struct Counter(AtomicI64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    /// Add `n`, resetting to 0 if the result would overflow.
    #[inline]
    pub fn add(&self, n: u64) {
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        // The closure never returns None, so the update always succeeds.
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(match current.checked_add(n) {
                    Some(next) if next >= 0 => next,
                    _ => 0,
                })
            });
    }

    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed).max(0) as u64
    }

    fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    #[cfg(test)]
    fn set(&self, value: i64) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// The six process-wide traffic counters.
#[derive(Debug, Default)]
pub struct TelemetryCounters {
    connections_accepted: Counter,
    connections_blocked: Counter,
    bytes_in: Counter,
    bytes_out: Counter,
    messages_in: Counter,
    messages_out: Counter,
}

/// Point-in-time copy of [`TelemetryCounters`] for external monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub connections_accepted: u64,
    pub connections_blocked: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub messages_in: u64,
    pub messages_out: u64,
}

impl TelemetryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.connections_accepted.increment();
    }

    pub fn record_blocked(&self) {
        self.connections_blocked.increment();
    }

    /// One inbound chunk of `bytes` length.
    #[inline]
    pub fn record_inbound(&self, bytes: u64) {
        self.bytes_in.add(bytes);
        self.messages_in.increment();
    }

    /// One outbound chunk of `bytes` length.
    #[inline]
    pub fn record_outbound(&self, bytes: u64) {
        self.bytes_out.add(bytes);
        self.messages_out.increment();
    }

    pub fn connections_accepted(&self) -> u64 {
        self.connections_accepted.get()
    }

    pub fn connections_blocked(&self) -> u64 {
        self.connections_blocked.get()
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in.get()
    }

    pub fn bytes_out(&self) -> u64 {
        self.bytes_out.get()
    }

    pub fn messages_in(&self) -> u64 {
        self.messages_in.get()
    }

    pub fn messages_out(&self) -> u64 {
        self.messages_out.get()
    }

    /// Read all six counters. Each field is read independently.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            connections_accepted: self.connections_accepted(),
            connections_blocked: self.connections_blocked(),
            bytes_in: self.bytes_in(),
            bytes_out: self.bytes_out(),
            messages_in: self.messages_in(),
            messages_out: self.messages_out(),
        }
    }

    /// Zero every counter. Intended for an external admin layer.
    pub fn reset(&self) {
        self.connections_accepted.reset();
        self.connections_blocked.reset();
        self.bytes_in.reset();
        self.bytes_out.reset();
        self.messages_in.reset();
        self.messages_out.reset();
        tracing::info!("Telemetry counters reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counter_clamps_at_max() {
        let c = Counter::new();
        c.set(i64::MAX);
        assert_eq!(c.get(), i64::MAX as u64);
        c.increment();
        assert_eq!(c.get(), 0);
    }

    #[test]
    fn test_large_add_clamps() {
        let c = Counter::new();
        c.add(10);
        c.add(u64::MAX);
        assert_eq!(c.get(), 0);

        c.set(i64::MAX - 5);
        c.add(5);
        assert_eq!(c.get(), i64::MAX as u64);
        c.add(1);
        assert_eq!(c.get(), 0);
    }

    #[test]
    fn test_chunk_updates_bytes_and_messages() {
        let counters = TelemetryCounters::new();
        counters.record_inbound(1024);
        counters.record_outbound(10);
        counters.record_outbound(20);

        let snap = counters.snapshot();
        assert_eq!(snap.bytes_in, 1024);
        assert_eq!(snap.messages_in, 1);
        assert_eq!(snap.bytes_out, 30);
        assert_eq!(snap.messages_out, 2);
        assert_eq!(snap.connections_accepted, 0);
        assert_eq!(snap.connections_blocked, 0);
    }

    #[test]
    fn test_reset() {
        let counters = TelemetryCounters::new();
        counters.record_accepted();
        counters.record_blocked();
        counters.record_inbound(5);
        counters.reset();
        assert_eq!(counters.snapshot(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(TelemetryCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counters = Arc::clone(&counters);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        counters.record_accepted();
                        counters.record_inbound(3);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counters.connections_accepted(), 80_000);
        assert_eq!(counters.messages_in(), 80_000);
        assert_eq!(counters.bytes_in(), 240_000);
    }
}
