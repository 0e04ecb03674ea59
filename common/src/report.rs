//! # Run Report
//!
//! The outcome of a single probe and the aggregate report of a run.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde::{Serialize, Serializer};

/// Result of one logical read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The peer announced its identity.
    Success { identity: String },
    /// Binding, connecting or (datagram) sending failed.
    ConnectFailure,
    /// The connection was established but no identity could be read.
    ReadFailure,
}

/// Counts accumulated while a run is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub hosts: HashMap<String, u64>,
    pub failed_connects: u64,
    pub failed_reads: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Success { identity } => *self.hosts.entry(identity).or_insert(0) += 1,
            ProbeOutcome::ConnectFailure => self.failed_connects += 1,
            ProbeOutcome::ReadFailure => self.failed_reads += 1,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hosts.values().sum()
    }

    /// Number of outcomes recorded so far.
    pub fn recorded(&self) -> u64 {
        self.hits() + self.failed_connects + self.failed_reads
    }
}

/// Frozen result of a run, handed to the output layer.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub hosts: HashMap<String, u64>,
    /// Requested number of probes.
    pub connects: usize,
    pub failed_connects: u64,
    pub failed_reads: u64,
    #[serde(serialize_with = "rfc3339")]
    pub start_time: SystemTime,
    #[serde(serialize_with = "nanos")]
    pub timeout: Duration,
    #[serde(serialize_with = "nanos")]
    pub duration: Duration,
}

impl Report {
    pub fn new(
        tally: Tally,
        connects: usize,
        start_time: SystemTime,
        timeout: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            hosts: tally.hosts,
            connects,
            failed_connects: tally.failed_connects,
            failed_reads: tally.failed_reads,
            start_time,
            timeout,
            duration,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed_connects > 0 || self.failed_reads > 0
    }

    /// Process exit status for scripting: 1 on any failure, 0 otherwise.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_failures())
    }

    /// Identities with their hit counts, sorted by identity.
    pub fn sorted_hosts(&self) -> Vec<(&str, u64)> {
        let mut hosts: Vec<(&str, u64)> = self
            .hosts
            .iter()
            .map(|(identity, hits)| (identity.as_str(), *hits))
            .collect();
        hosts.sort_unstable();
        hosts
    }
}

fn rfc3339<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_rfc3339_nanos(*time))
}

fn nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
