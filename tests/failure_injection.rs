//! Failure injection tests for the guard.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

use edge_guard::config::{FilterReloader, GuardConfig};

mod common;

#[tokio::test]
async fn test_upstream_down_closes_admitted_connection() {
    // Reserve a port, then free it so nothing is listening there.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let guard = common::start_guard(dead_addr, &[]).await;

    let mut client = TcpStream::connect(guard.addr).await.unwrap();
    let mut buf = [0u8; 8];
    let read = tokio::time::timeout(Duration::from_secs(5), client.read(&mut buf))
        .await
        .expect("connection should be closed after upstream failure");
    assert!(matches!(read, Ok(0) | Err(_)));

    // Admission happened before the upstream failed.
    assert_eq!(guard.counters.connections_accepted(), 1);
    assert_eq!(guard.counters.connections_blocked(), 0);
    assert_eq!(guard.counters.bytes_out(), 0);

    guard.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_reload_keeps_current_filter() {
    let (upstream, _) = common::start_echo_upstream().await;
    let guard = common::start_guard(upstream, &["10.0.0.0/8"]).await;

    let path = std::env::temp_dir().join(format!("edge-guard-reload-{}.toml", std::process::id()));
    let reloader = FilterReloader::new(&path, &GuardConfig::default());

    std::fs::write(&path, "[filter]\nranges = [\"10.0.0.0/8\", \"not-a-range\"]\n").unwrap();
    assert!(reloader.reload().is_err());
    assert_eq!(guard.filter.current().len(), 1);

    std::fs::write(&path, "[filter]\nranges = [\"10.0.0.0/8\", \"192.0.2.0/24\"]\n").unwrap();
    guard.filter_tx.send(reloader.reload().unwrap()).unwrap();

    assert!(common::wait_until(|| guard.filter.current().len() == 2).await);
    assert!(!guard.filter.current().accepts(&"127.0.0.1".parse().unwrap()));

    // Peers outside the ranges are still refused after the reload.
    let mut client = TcpStream::connect(guard.addr).await.unwrap();
    let mut buf = [0u8; 1];
    let _ = client.read(&mut buf).await;
    assert!(common::wait_until(|| guard.counters.connections_blocked() == 1).await);

    std::fs::remove_file(path).unwrap();
    guard.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (upstream, _) = common::start_echo_upstream().await;
    let guard = common::start_guard(upstream, &[]).await;
    let addr = guard.addr;

    guard.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The listener is gone once the server task returns.
    let refused = TcpStream::connect(addr).await;
    assert!(refused.is_err());
    assert_eq!(guard.counters.connections_accepted(), 0);
}
