//! Runs one batch of probes and freezes the result into a [`Report`].
//!
//! Order of a run:
//! 1. the aggregator starts, so no outcome can be dropped;
//! 2. the shared deadline and the admission limiter are created;
//! 3. `connections` probe tasks are spawned, each with its own source address;
//! 4. once every task returned, the deadline is cancelled and the aggregator is
//!    stopped, which returns only after every queued outcome was applied.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use mconnect_common::config::Config;
use mconnect_common::error::ConfigError;
use mconnect_common::network::generator::AddressGenerator;
use mconnect_common::network::range::AddressRange;
use mconnect_common::report::Report;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::{Aggregator, ProgressFn};
use crate::deadline::{self, Deadline};
use crate::limiter::AdmissionLimiter;
use crate::probe::{self, ProbeContext};

pub struct Dispatcher {
    config: Config,
    target: SocketAddr,
    sources: Option<AddressGenerator>,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl Dispatcher {
    /// Validates `config` and resolves the target.
    ///
    /// Every error here aborts the run before a single probe starts.
    pub async fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let sources = match config.source_cidr.as_deref() {
            Some(cidr) => {
                let range: AddressRange = cidr.parse()?;
                Some(AddressGenerator::new(range, config.explicit_seed()))
            }
            None => None,
        };

        let target = resolve(&config.target).await?;

        Ok(Self {
            config,
            target,
            sources,
            cancel: CancellationToken::new(),
            progress: None,
        })
    }

    /// Cancelling `token` ends the run early, as if the deadline expired.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub async fn run(mut self) -> anyhow::Result<Report> {
        let connections = self.config.connections;
        let timeout = deadline::run_timeout(self.config.keep_open, self.config.timeout, connections);

        let aggregator = Aggregator::start(self.progress.take());

        let start_time = SystemTime::now();
        let started = Instant::now();
        let deadline = Deadline::start(timeout, &self.cancel);

        info!(
            "Probing {} with {connections} connections ({} concurrent, timeout {})",
            self.target,
            self.config.max_concurrent,
            humanize(timeout),
        );
        if let Some(sources) = &self.sources {
            info!("Random source addresses from {}", sources.range());
        }

        let ctx = ProbeContext {
            target: self.target,
            limiter: AdmissionLimiter::new(self.config.max_concurrent),
            deadline: deadline.clone(),
            outcomes: aggregator.sender(),
        };
        let prober = probe::for_config(&self.config);

        let mut probes = JoinSet::new();
        for id in 0..connections {
            let source = self.sources.as_mut().map(AddressGenerator::draw);
            let prober = Arc::clone(&prober);
            let ctx = ctx.clone();
            probes.spawn(async move { prober.probe(id, source, &ctx).await });
        }
        drop(ctx);

        while let Some(joined) = probes.join_next().await {
            if let Err(e) = joined {
                warn!("Probe task ended abnormally: {e}");
            }
        }
        deadline.cancel();

        let tally = aggregator.stop().await?;
        let report = Report::new(tally, connections, start_time, timeout, started.elapsed());
        info!(
            "Run finished in {}: {} failed connects, {} failed reads",
            humanize(report.duration),
            report.failed_connects,
            report.failed_reads,
        );
        Ok(report)
    }
}

async fn resolve(target: &str) -> Result<SocketAddr, ConfigError> {
    let unresolvable = |reason: String| ConfigError::UnresolvableTarget {
        target: target.to_string(),
        reason,
    };
    let mut addrs = tokio::net::lookup_host(target)
        .await
        .map_err(|e| unresolvable(e.to_string()))?;
    addrs
        .next()
        .ok_or_else(|| unresolvable("no addresses found".to_string()))
}

fn humanize(duration: std::time::Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
