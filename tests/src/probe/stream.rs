use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mconnect_common::config::{ClosePolicy, Config};
use mconnect_core::Dispatcher;

use crate::util::{IDENTITY, client, closed_port, responder, scripted_server};

/*************************************************************
                    Tests for single reads
**************************************************************/

#[tokio::test]
async fn every_probe_reports_the_responder_identity() {
    let (addr, token) = responder(false).await;
    let cfg = Config {
        max_concurrent: 16,
        ..client(addr, 100)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    token.cancel();

    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts.get(IDENTITY), Some(&100));
    assert_eq!(report.failed_connects, 0);
    assert_eq!(report.failed_reads, 0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn refused_connects_are_counted_and_fail_the_run() {
    let addr = closed_port().await;

    let report = Dispatcher::new(client(addr, 10)).await.unwrap().run().await.unwrap();

    assert_eq!(report.failed_connects, 10);
    assert_eq!(report.failed_reads, 0);
    assert!(report.hosts.is_empty());
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn outcomes_add_up_to_the_number_of_probes() {
    let (addr, token) = responder(false).await;
    let report = Dispatcher::new(client(addr, 37)).await.unwrap().run().await.unwrap();
    token.cancel();

    let hits: u64 = report.hosts.values().sum();
    assert_eq!(
        hits + report.failed_connects + report.failed_reads,
        report.connects as u64
    );
}

#[tokio::test]
async fn progress_sees_every_outcome() {
    let (addr, token) = responder(false).await;
    let last = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&last);

    let report = Dispatcher::new(client(addr, 25))
        .await
        .unwrap()
        .with_progress(Arc::new(move |count| seen.store(count, Ordering::SeqCst)))
        .run()
        .await
        .unwrap();
    token.cancel();

    assert_eq!(report.connects, 25);
    assert_eq!(last.load(Ordering::SeqCst), 25);
}

/*************************************************************
                    Tests for keep-open mode
**************************************************************/

#[tokio::test]
async fn keep_open_counts_each_identity_and_the_final_close() {
    let addr = scripted_server(&["hostA", "hostA", "hostA"]).await;
    let cfg = Config {
        keep_open: true,
        timeout: None,
        ..client(addr, 4)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();

    assert_eq!(report.hosts.get(IDENTITY), Some(&12));
    assert_eq!(report.failed_reads, 4);
    assert_eq!(report.exit_code(), 1);
    assert!(report.duration < Duration::from_secs(10));
}

#[tokio::test]
async fn keep_open_with_clean_end_policy_succeeds() {
    let addr = scripted_server(&["hostA", "hostA", "hostA"]).await;
    let cfg = Config {
        keep_open: true,
        timeout: None,
        close_policy: ClosePolicy::CleanEnd,
        ..client(addr, 4)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();

    assert_eq!(report.hosts.get(IDENTITY), Some(&12));
    assert_eq!(report.failed_reads, 0);
    assert_eq!(report.exit_code(), 0);
}

/*************************************************************
                 Tests for random source addresses
**************************************************************/

#[cfg(target_os = "linux")]
#[tokio::test]
async fn loopback_sources_reach_the_responder() {
    let (addr, token) = responder(false).await;
    let cfg = Config {
        source_cidr: Some("127.0.0.0/8".to_string()),
        seed: Some(42),
        ..client(addr, 20)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    token.cancel();

    assert_eq!(report.hosts.get(IDENTITY), Some(&20));
    assert_eq!(report.exit_code(), 0);
}
