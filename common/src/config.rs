use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ADDRESS: &str = "[::1]:5001";
pub const DEFAULT_MAX_CONCURRENT: usize = 64;

/// Transport used by every probe of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Stream,
    Datagram,
}

/// How a keep-open probe treats a clean close initiated by the peer.
///
/// A close before the first identity has been read is always a failed read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClosePolicy {
    /// The close is recorded as a failed read.
    #[default]
    Failure,
    /// The close ends the probe without touching the failure counters.
    CleanEnd,
}

/// Settings of one client run.
#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` of the (virtual) address to probe.
    pub target: String,
    pub transport: Transport,
    /// Number of probes to start.
    pub connections: usize,
    /// Keep every connection open and read until it fails or the run ends.
    pub keep_open: bool,
    /// Overrides the computed run deadline. Ignored in keep-open mode.
    pub timeout: Option<Duration>,
    /// Capacity of the admission limiter around the connect step.
    ///
    /// Should in general be lower than the listen backlog of the server
    /// (`/proc/sys/net/core/somaxconn`).
    pub max_concurrent: usize,
    /// Base cidr for random source addresses, e.g. `10.0.0.0/16`.
    pub source_cidr: Option<String>,
    /// Seed for the random source. `None` or `0` seeds from the clock.
    pub seed: Option<u64>,
    pub close_policy: ClosePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: DEFAULT_ADDRESS.to_string(),
            transport: Transport::Stream,
            connections: 1,
            keep_open: false,
            timeout: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            source_cidr: None,
            seed: None,
            close_policy: ClosePolicy::Failure,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// The explicit seed, if one was configured.
    pub fn explicit_seed(&self) -> Option<u64> {
        self.seed.filter(|seed| *seed != 0)
    }
}

/// Settings of the identity responder (server mode).
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub address: SocketAddr,
    /// Announced on every connection and every datagram.
    pub identity: String,
    /// Also answer datagrams on the same address.
    pub datagram: bool,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
