//! The per-connection probe.
//!
//! A probe walks `BindSource -> Connecting -> Reading` and stops at the first
//! failure. The phase that was in progress decides how the failure is counted,
//! which is also how a deadline expiry is counted: it is never a category of
//! its own.
//!
//! Concrete transports live in [`stream`] and [`datagram`]; the
//! [`Dispatcher`](crate::Dispatcher) only sees the [`Prober`] trait.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use mconnect_common::config::{Config, Transport};
use mconnect_common::report::ProbeOutcome;
use thiserror::Error;
use tracing::{debug, trace};

use crate::aggregator::OutcomeSender;
use crate::deadline::Deadline;
use crate::limiter::AdmissionLimiter;

mod datagram;
mod stream;

pub use datagram::DatagramProber;
pub use stream::StreamProber;

/// Size of the identity read buffer.
pub const READ_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BindSource,
    Connecting,
    Reading,
}

#[derive(Debug, Error)]
#[error("{phase:?} failed: {source}")]
pub struct ProbeError {
    pub phase: Phase,
    #[source]
    pub source: io::Error,
}

impl ProbeError {
    pub fn new(phase: Phase, source: io::Error) -> Self {
        Self { phase, source }
    }

    pub fn outcome(&self) -> ProbeOutcome {
        match self.phase {
            Phase::BindSource | Phase::Connecting => ProbeOutcome::ConnectFailure,
            Phase::Reading => ProbeOutcome::ReadFailure,
        }
    }
}

/// Everything a probe shares with the rest of the run.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub target: SocketAddr,
    pub limiter: AdmissionLimiter,
    pub deadline: Deadline,
    pub outcomes: OutcomeSender,
}

impl ProbeContext {
    /// Runs `op` while holding an admission slot.
    ///
    /// The slot is released as soon as `op` resolves, whatever the result, so
    /// the limiter bounds concurrent connects and never the open connections.
    pub async fn admitted<F, T>(&self, op: F) -> io::Result<T>
    where
        F: Future<Output = io::Result<T>>,
    {
        let slot = self
            .deadline
            .guard(async { self.limiter.acquire().await.map_err(io::Error::other) })
            .await?;
        let res = self.deadline.guard(op).await;
        drop(slot);
        res
    }

    /// Reports a failed probe.
    pub async fn fail(&self, id: usize, err: ProbeError) {
        debug!(probe = id, phase = ?err.phase, "{}", err.source);
        self.outcomes.emit(err.outcome()).await;
    }

    pub async fn identity(&self, bytes: &[u8]) {
        let identity = String::from_utf8_lossy(bytes).into_owned();
        trace!(%identity, "identity read");
        self.outcomes.emit(ProbeOutcome::Success { identity }).await;
    }
}

/// One probe strategy per transport.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Runs probe `id` to completion, reporting through `ctx.outcomes`.
    ///
    /// `source` is the local address to bind, if the run uses random sources.
    async fn probe(&self, id: usize, source: Option<IpAddr>, ctx: &ProbeContext);
}

pub fn for_config(cfg: &Config) -> Arc<dyn Prober> {
    match cfg.transport {
        Transport::Stream => Arc::new(StreamProber::new(cfg.keep_open, cfg.close_policy)),
        Transport::Datagram => Arc::new(DatagramProber),
    }
}

/// Local endpoint for an outgoing socket: the drawn source or the wildcard
/// of the target's family, always with an ephemeral port.
pub(crate) fn local_endpoint(source: Option<IpAddr>, target: SocketAddr) -> SocketAddr {
    let ip = source.unwrap_or(match target {
        SocketAddr::V4(_) => IpAddr::from([0u8; 4]),
        SocketAddr::V6(_) => IpAddr::from([0u8; 16]),
    });
    SocketAddr::new(ip, 0)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
