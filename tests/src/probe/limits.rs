use std::time::{Duration, Instant};

use mconnect_common::config::Config;
use mconnect_core::Dispatcher;
use tokio::net::TcpListener;

use crate::util::{IDENTITY, client, gated_server};

/*************************************************************
                      Tests for the deadline
**************************************************************/

#[tokio::test]
async fn silent_peer_is_bounded_by_the_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let timeout = Duration::from_millis(300);
    let cfg = Config {
        timeout: Some(timeout),
        ..client(listener.local_addr().unwrap(), 5)
    };

    let started = Instant::now();
    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    let elapsed = started.elapsed();
    drop(listener);

    assert!(elapsed < timeout + Duration::from_secs(2), "took {elapsed:?}");
    assert_eq!(report.timeout, timeout);
    assert_eq!(report.failed_reads + report.failed_connects, 5);
    assert!(report.hosts.is_empty());
}

#[tokio::test]
async fn default_timeout_scales_with_connections() {
    let (addr, token) = crate::util::responder(false).await;
    let cfg = Config {
        timeout: None,
        ..client(addr, 200)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    token.cancel();

    assert_eq!(report.timeout, Duration::from_millis(2_200));
    assert_eq!(report.hosts.get(IDENTITY), Some(&200));
}

/*************************************************************
                    Tests for admission control
**************************************************************/

#[tokio::test]
async fn slot_is_released_before_reading() {
    let addr = gated_server(5).await;
    let cfg = Config {
        max_concurrent: 1,
        timeout: Some(Duration::from_secs(5)),
        ..client(addr, 5)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();

    assert_eq!(report.hosts.get(IDENTITY), Some(&5));
    assert_eq!(report.exit_code(), 0);
}
