use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use mconnect_common::config::ClosePolicy;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpSocket, TcpStream};
use tracing::trace;

use super::{Phase, ProbeContext, ProbeError, Prober, READ_BUFFER_SIZE};

/// Connection-oriented probe: connect, then read identities.
#[derive(Debug, Clone, Copy)]
pub struct StreamProber {
    keep_open: bool,
    close_policy: ClosePolicy,
}

#[async_trait]
impl Prober for StreamProber {
    async fn probe(&self, id: usize, source: Option<IpAddr>, ctx: &ProbeContext) {
        match self.session(source, ctx).await {
            Ok(reads) => trace!(probe = id, reads, "closed"),
            Err(err) => ctx.fail(id, err).await,
        }
    }
}

impl StreamProber {
    pub fn new(keep_open: bool, close_policy: ClosePolicy) -> Self {
        Self {
            keep_open,
            close_policy,
        }
    }

    /// Returns the number of identities read before the probe closed.
    async fn session(&self, source: Option<IpAddr>, ctx: &ProbeContext) -> Result<u64, ProbeError> {
        let socket =
            bind(source, ctx.target).map_err(|e| ProbeError::new(Phase::BindSource, e))?;

        let mut stream: TcpStream = ctx
            .admitted(socket.connect(ctx.target))
            .await
            .map_err(|e| ProbeError::new(Phase::Connecting, e))?;

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut reads: u64 = 0;
        loop {
            let len = ctx
                .deadline
                .guard(stream.read(&mut buf))
                .await
                .map_err(|e| ProbeError::new(Phase::Reading, e))?;

            if len == 0 {
                return self.on_peer_close(reads);
            }

            reads += 1;
            ctx.identity(&buf[..len]).await;

            if !self.keep_open {
                return Ok(reads);
            }
        }
    }

    fn on_peer_close(&self, reads: u64) -> Result<u64, ProbeError> {
        let clean = self.keep_open && reads > 0 && self.close_policy == ClosePolicy::CleanEnd;
        if clean {
            Ok(reads)
        } else {
            Err(ProbeError::new(
                Phase::Reading,
                io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by peer"),
            ))
        }
    }
}

fn bind(source: Option<IpAddr>, target: SocketAddr) -> io::Result<TcpSocket> {
    let socket = match target {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    if source.is_some() {
        socket.bind(super::local_endpoint(source, target))?;
    }
    Ok(socket)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
