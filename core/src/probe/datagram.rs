use std::net::IpAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::trace;

use super::{Phase, ProbeContext, ProbeError, Prober, READ_BUFFER_SIZE};

/// Request payload; the responder ignores its content.
pub const HELLO: &[u8] = b"Hello";

/// Single request/response exchange without a connection.
///
/// A failed send counts as a failed connect and a failed receive as a failed
/// read, mirroring the stream probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatagramProber;

#[async_trait]
impl Prober for DatagramProber {
    async fn probe(&self, id: usize, source: Option<IpAddr>, ctx: &ProbeContext) {
        match exchange(source, ctx).await {
            Ok(len) => trace!(probe = id, len, "answered"),
            Err(err) => ctx.fail(id, err).await,
        }
    }
}

async fn exchange(source: Option<IpAddr>, ctx: &ProbeContext) -> Result<usize, ProbeError> {
    let local = super::local_endpoint(source, ctx.target);
    let socket = ctx
        .deadline
        .guard(UdpSocket::bind(local))
        .await
        .map_err(|e| ProbeError::new(Phase::BindSource, e))?;

    ctx.admitted(async {
        socket.connect(ctx.target).await?;
        socket.send(HELLO).await
    })
    .await
    .map_err(|e| ProbeError::new(Phase::Connecting, e))?;

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let len = ctx
        .deadline
        .guard(socket.recv(&mut buf))
        .await
        .map_err(|e| ProbeError::new(Phase::Reading, e))?;

    ctx.identity(&buf[..len]).await;
    Ok(len)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
