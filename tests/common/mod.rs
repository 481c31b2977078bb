//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_guard::config::GuardConfig;
use edge_guard::filter::{FilterConfiguration, RangeSet};
use edge_guard::lifecycle::Shutdown;
use edge_guard::net::Listener;
use edge_guard::relay::GuardServer;
use edge_guard::telemetry::TelemetryCounters;

/// Start an echo upstream. Returns its address and a count of accepted connections.
pub async fn start_echo_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&accepted);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    count.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    if socket.write_all(&buf[..n]).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, accepted)
}

/// A running guard and the handles tests need to observe and steer it.
#[allow(dead_code)]
pub struct TestGuard {
    pub addr: SocketAddr,
    pub counters: Arc<TelemetryCounters>,
    pub filter: Arc<FilterConfiguration>,
    pub filter_tx: mpsc::UnboundedSender<RangeSet>,
    pub shutdown: Shutdown,
}

/// Start a guard on loopback in front of `upstream` admitting `ranges`.
pub async fn start_guard(upstream: SocketAddr, ranges: &[&str]) -> TestGuard {
    start_guard_on("127.0.0.1:0", upstream, ranges).await
}

/// Start a guard bound to `bind_address`.
pub async fn start_guard_on(bind_address: &str, upstream: SocketAddr, ranges: &[&str]) -> TestGuard {
    let mut config = GuardConfig::default();
    config.listener.bind_address = bind_address.into();
    config.upstream.address = upstream.to_string();
    config.upstream.connect_timeout_secs = 2;
    config.filter.ranges = ranges.iter().map(|r| r.to_string()).collect();

    let filter = Arc::new(FilterConfiguration::new(config.filter.range_set().unwrap()));
    let counters = Arc::new(TelemetryCounters::new());
    let shutdown = Shutdown::new();
    let (filter_tx, filter_rx) = mpsc::unbounded_channel();

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = GuardServer::new(&config, Arc::clone(&filter), Arc::clone(&counters));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, filter_rx, server_shutdown).await;
    });

    TestGuard {
        addr,
        counters,
        filter,
        filter_tx,
        shutdown,
    }
}

/// Poll `cond` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
