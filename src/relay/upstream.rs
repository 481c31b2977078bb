//! Relaying one admitted connection to the upstream server.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::guard::{AccountingSink, ConnectionAccounting, MeteredStream, TrafficInterceptor};
use crate::net::ConnectionGuard;

/// Where and how admitted connections are forwarded.
#[derive(Debug)]
pub struct Upstream {
    address: String,
    connect_timeout: Duration,
    interceptor: Arc<TrafficInterceptor>,
}

impl Upstream {
    pub fn new(address: String, connect_timeout: Duration, interceptor: Arc<TrafficInterceptor>) -> Self {
        Self {
            address,
            connect_timeout,
            interceptor,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect to the upstream and copy bytes both ways until either side closes.
    ///
    /// The client side is metered: reads from the peer are inbound chunks,
    /// writes back to the peer are outbound chunks.
    pub async fn relay<S>(&self, client: S, guard: ConnectionGuard)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let connection_id = guard.id();
        let accounting = Arc::new(ConnectionAccounting::new());
        let sink: Arc<dyn AccountingSink> = accounting.clone();
        let mut client = MeteredStream::new(client, Arc::clone(&self.interceptor), sink);

        let mut upstream = match tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(self.address.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::warn!(connection_id = %connection_id, upstream = %self.address, error = %e, "Upstream connect failed");
                return;
            }
            Err(_) => {
                tracing::warn!(connection_id = %connection_id, upstream = %self.address, timeout = ?self.connect_timeout, "Upstream connect timed out");
                return;
            }
        };
        let _ = upstream.set_nodelay(true);

        if let Err(e) = tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
            tracing::debug!(connection_id = %connection_id, error = %e, "Relay ended with error");
        }

        tracing::debug!(
            connection_id = %connection_id,
            bytes_in = accounting.bytes_in(),
            bytes_out = accounting.bytes_out(),
            "Connection finished"
        );
    }
}
