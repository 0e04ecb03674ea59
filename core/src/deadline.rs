//! The single run deadline shared by every probe.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Horizon used in keep-open mode, where connections are meant to stay up.
pub const KEEP_OPEN_TIMEOUT: Duration = Duration::from_secs(60 * 60);
/// Connect rate assumed when no explicit timeout is given.
pub const ASSUMED_CONNECTS_PER_SEC: u64 = 1_000;
pub const TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Computes the run timeout.
///
/// Sockets can take minutes to give up on a connect, so without an explicit
/// timeout the run is bounded by `connections` at the assumed connect rate
/// plus a fixed margin.
pub fn run_timeout(keep_open: bool, timeout: Option<Duration>, connections: usize) -> Duration {
    if keep_open {
        return KEEP_OPEN_TIMEOUT;
    }
    if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
        return timeout;
    }
    let nanos = (connections as u64).saturating_mul(1_000_000_000) / ASSUMED_CONNECTS_PER_SEC;
    Duration::from_nanos(nanos) + TIMEOUT_MARGIN
}

/// A fixed expiry plus a cancellation token.
///
/// Cloning is cheap; all clones observe the same expiry and the same token.
#[derive(Debug, Clone)]
pub struct Deadline {
    timeout: Duration,
    expires_at: Instant,
    token: CancellationToken,
}

impl Deadline {
    /// Starts the clock now. Cancelling `parent` also cancels this deadline.
    pub fn start(timeout: Duration, parent: &CancellationToken) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self {
            timeout,
            expires_at,
            token: parent.child_token(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.expires_at
    }

    /// Aborts every operation still running under this deadline.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Runs `op` unless the deadline expires or is cancelled first.
    ///
    /// Expiry surfaces as [`io::ErrorKind::TimedOut`], cancellation as
    /// [`io::ErrorKind::Interrupted`].
    pub async fn guard<F, T>(&self, op: F) -> io::Result<T>
    where
        F: Future<Output = io::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                Err(io::Error::new(io::ErrorKind::Interrupted, "probe run cancelled"))
            }
            _ = tokio::time::sleep_until(self.expires_at) => {
                Err(io::Error::new(io::ErrorKind::TimedOut, "run deadline exceeded"))
            }
            res = op => res,
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
