use std::net::SocketAddr;
use std::time::Duration;

use mconnect_common::config::{Config, ResponderConfig};
use mconnect_core::Responder;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const IDENTITY: &str = "hostA";

/// Starts a responder on an ephemeral loopback port.
pub async fn responder(datagram: bool) -> (SocketAddr, CancellationToken) {
    let cfg = ResponderConfig {
        address: "127.0.0.1:0".parse().unwrap(),
        identity: IDENTITY.to_string(),
        datagram,
    };
    let responder = Responder::bind(&cfg).await.unwrap();
    let addr = responder.local_addr().unwrap();
    let token = CancellationToken::new();
    tokio::spawn(responder.serve(token.clone()));
    (addr, token)
}

/// Every accepted connection receives `messages`, 50ms apart, then is closed.
pub async fn scripted_server(messages: &'static [&'static str]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut conn, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                conn.set_nodelay(true).unwrap();
                for msg in messages {
                    if conn.write_all(msg.as_bytes()).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            });
        }
    });
    addr
}

/// Holds back every identity until `expected` connections were accepted.
pub async fn gated_server(expected: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut conns = Vec::with_capacity(expected);
        while conns.len() < expected {
            let (conn, _) = listener.accept().await.unwrap();
            conns.push(conn);
        }
        for conn in conns.iter_mut() {
            conn.write_all(IDENTITY.as_bytes()).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client(target: SocketAddr, connections: usize) -> Config {
    Config {
        target: target.to_string(),
        connections,
        timeout: Some(Duration::from_secs(10)),
        ..Config::default()
    }
}
