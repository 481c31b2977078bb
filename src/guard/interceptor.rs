//! Traffic interception for admitted connections.
//!
//! Every chunk read from or written to an admitted connection passes through
//! here. The interceptor updates the shared counters and forwards the byte
//! count to the connection's [`AccountingSink`]; the chunk itself is handed
//! back untouched.

use std::sync::Arc;

use crate::guard::accounting::AccountingSink;
use crate::telemetry::TelemetryCounters;

/// An event flowing through a connection in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Payload bytes.
    Data(&'a [u8]),
    /// Flush, shutdown and other events without payload.
    Control,
}

/// Shared, stateless interceptor. One instance serves every connection.
#[derive(Debug, Clone)]
pub struct TrafficInterceptor {
    counters: Arc<TelemetryCounters>,
}

impl TrafficInterceptor {
    pub fn new(counters: Arc<TelemetryCounters>) -> Self {
        Self { counters }
    }

    /// A chunk received from the peer.
    #[inline]
    pub fn on_inbound<'a, S>(&self, chunk: Chunk<'a>, sink: &S) -> Chunk<'a>
    where
        S: AccountingSink + ?Sized,
    {
        if let Chunk::Data(bytes) = chunk {
            let len = bytes.len() as u64;
            self.counters.record_inbound(len);
            sink.record_inbound(len);
        }
        chunk
    }

    /// A chunk accepted by a write to the peer.
    ///
    /// Callers pass only the bytes the write actually took, so the count is
    /// what left this layer, not the buffer's capacity.
    #[inline]
    pub fn on_outbound<'a, S>(&self, chunk: Chunk<'a>, sink: &S) -> Chunk<'a>
    where
        S: AccountingSink + ?Sized,
    {
        if let Chunk::Data(bytes) = chunk {
            let len = bytes.len() as u64;
            self.counters.record_outbound(len);
            sink.record_outbound(len);
        }
        chunk
    }

    pub fn counters(&self) -> &Arc<TelemetryCounters> {
        &self.counters
    }
}
