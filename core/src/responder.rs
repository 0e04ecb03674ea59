//! The identity responder (server mode).
//!
//! Stream: the identity is written as soon as a connection is accepted and
//! again for every chunk the client sends. Datagram: every datagram is
//! answered with the identity.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mconnect_common::config::ResponderConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STREAM_BUFFER_SIZE: usize = 1024;
const DATAGRAM_BUFFER_SIZE: usize = 9000;

pub struct Responder {
    listener: TcpListener,
    datagram: Option<Arc<UdpSocket>>,
    identity: Arc<str>,
}

impl Responder {
    /// Binds the stream listener and, if enabled, a datagram socket on the
    /// same address (port 0 resolves to the listener's port).
    pub async fn bind(cfg: &ResponderConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(cfg.address)
            .await
            .with_context(|| format!("listening on {}", cfg.address))?;

        let datagram = if cfg.datagram {
            let addr = listener.local_addr()?;
            let socket = UdpSocket::bind(addr)
                .await
                .with_context(|| format!("binding datagram socket on {addr}"))?;
            Some(Arc::new(socket))
        } else {
            None
        };

        Ok(Self {
            listener,
            datagram,
            identity: Arc::from(cfg.identity.as_str()),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn datagram_addr(&self) -> Option<SocketAddr> {
        self.datagram.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Serves until `token` is cancelled.
    pub async fn serve(self, token: CancellationToken) -> anyhow::Result<()> {
        let mut tasks = JoinSet::new();

        if let Some(socket) = &self.datagram {
            let readers = std::thread::available_parallelism().map_or(1, |n| n.get());
            info!("Answering datagrams on {} with {readers} readers", socket.local_addr()?);
            for _ in 0..readers {
                tasks.spawn(answer_datagrams(
                    Arc::clone(socket),
                    Arc::clone(&self.identity),
                    token.clone(),
                ));
            }
        }

        info!("Listening on {} as '{}'", self.listener.local_addr()?, self.identity);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let identity = Arc::clone(&self.identity);
                        let token = token.clone();
                        tasks.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {}
                                res = handle_connection(stream, identity) => {
                                    if let Err(e) = res {
                                        debug!("{peer}: {e}");
                                    }
                                }
                            }
                        });
                    }
                    Err(e) => warn!("Accept failed: {e}"),
                },
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        tasks.shutdown().await;
        Ok(())
    }
}

async fn handle_connection(mut stream: TcpStream, identity: Arc<str>) -> io::Result<()> {
    stream.write_all(identity.as_bytes()).await?;
    let mut buf = [0u8; STREAM_BUFFER_SIZE];
    loop {
        if stream.read(&mut buf).await? == 0 {
            return Ok(());
        }
        stream.write_all(identity.as_bytes()).await?;
    }
}

async fn answer_datagrams(socket: Arc<UdpSocket>, identity: Arc<str>, token: CancellationToken) {
    let mut buf = vec![0u8; DATAGRAM_BUFFER_SIZE];
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            received = socket.recv_from(&mut buf) => match received {
                Ok((_, peer)) => {
                    if let Err(e) = socket.send_to(identity.as_bytes(), peer).await {
                        debug!("{peer}: {e}");
                    }
                }
                Err(e) => debug!("Datagram receive failed: {e}"),
            },
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
