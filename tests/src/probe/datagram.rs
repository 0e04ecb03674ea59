use std::time::Duration;

use mconnect_common::config::{Config, Transport};
use mconnect_core::Dispatcher;
use tokio::net::UdpSocket;

use crate::util::{IDENTITY, client, responder};

#[tokio::test]
async fn datagram_probes_are_answered() {
    let (addr, token) = responder(true).await;
    let cfg = Config {
        transport: Transport::Datagram,
        ..client(addr, 20)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    token.cancel();

    assert_eq!(report.hosts.get(IDENTITY), Some(&20));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn unanswered_datagrams_are_read_failures() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let cfg = Config {
        transport: Transport::Datagram,
        timeout: Some(Duration::from_millis(300)),
        ..client(silent.local_addr().unwrap(), 5)
    };

    let report = Dispatcher::new(cfg).await.unwrap().run().await.unwrap();
    drop(silent);

    assert_eq!(report.failed_reads, 5);
    assert!(report.hosts.is_empty());
}
