//! Single-writer aggregation of probe outcomes.
//!
//! Probes never touch the counts. They push outcomes into a bounded queue and
//! one task applies them in order. Stopping sends a sentinel behind every
//! outcome already queued and waits for the task to hand back its tally.

use std::sync::Arc;

use anyhow::Context;
use mconnect_common::report::{ProbeOutcome, Tally};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Capacity of the outcome queue.
pub const QUEUE_CAPACITY: usize = 100;

/// Called with the number of outcomes processed so far.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Debug)]
enum Event {
    Outcome(ProbeOutcome),
    Stop,
}

/// Producer side handed to every probe.
#[derive(Debug, Clone)]
pub struct OutcomeSender {
    tx: mpsc::Sender<Event>,
}

impl OutcomeSender {
    pub async fn emit(&self, outcome: ProbeOutcome) {
        if self.tx.send(Event::Outcome(outcome)).await.is_err() {
            warn!("aggregator stopped, outcome dropped");
        }
    }
}

pub struct Aggregator {
    tx: mpsc::Sender<Event>,
    handle: JoinHandle<Tally>,
}

impl Aggregator {
    /// Spawns the consumer task. Must run before any probe starts.
    pub fn start(progress: Option<ProgressFn>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(consume(rx, progress));
        Self { tx, handle }
    }

    pub fn sender(&self) -> OutcomeSender {
        OutcomeSender {
            tx: self.tx.clone(),
        }
    }

    /// Sends the stop sentinel and waits for the final tally.
    ///
    /// Only call once every producer has finished, otherwise outcomes queued
    /// after the sentinel are lost.
    pub async fn stop(self) -> anyhow::Result<Tally> {
        self.tx
            .send(Event::Stop)
            .await
            .context("aggregator exited before the stop signal")?;
        self.handle.await.context("aggregator task failed")
    }
}

async fn consume(mut rx: mpsc::Receiver<Event>, progress: Option<ProgressFn>) -> Tally {
    let mut tally = Tally::default();
    while let Some(event) = rx.recv().await {
        match event {
            Event::Outcome(outcome) => {
                trace!(?outcome, "outcome");
                tally.record(outcome);
                if let Some(progress) = &progress {
                    progress(tally.recorded());
                }
            }
            Event::Stop => break,
        }
    }
    tally
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn empty_run_yields_empty_tally() {
        let aggregator = Aggregator::start(None);
        let tally = aggregator.stop().await.unwrap();
        assert_eq!(tally, Tally::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_are_all_counted() {
        let aggregator = Aggregator::start(None);

        let mut producers = tokio::task::JoinSet::new();
        for p in 0..16 {
            let sender = aggregator.sender();
            producers.spawn(async move {
                for i in 0..250 {
                    let outcome = match i % 5 {
                        0 => ProbeOutcome::ConnectFailure,
                        1 => ProbeOutcome::ReadFailure,
                        _ => ProbeOutcome::Success {
                            identity: format!("host-{}", p % 4),
                        },
                    };
                    sender.emit(outcome).await;
                }
            });
        }
        while let Some(res) = producers.join_next().await {
            res.unwrap();
        }

        let tally = aggregator.stop().await.unwrap();
        assert_eq!(tally.recorded(), 16 * 250);
        assert_eq!(tally.failed_connects, 16 * 50);
        assert_eq!(tally.failed_reads, 16 * 50);
        assert_eq!(tally.hosts.len(), 4);
        for hits in tally.hosts.values() {
            assert_eq!(*hits, 4 * 150);
        }
    }

    #[tokio::test]
    async fn progress_sees_every_outcome() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_ref = Arc::clone(&seen);
        let aggregator = Aggregator::start(Some(Arc::new(move |count| {
            seen_ref.store(count, Ordering::SeqCst);
        })));

        let sender = aggregator.sender();
        for _ in 0..250 {
            sender.emit(ProbeOutcome::ReadFailure).await;
        }
        drop(sender);

        let tally = aggregator.stop().await.unwrap();
        assert_eq!(tally.failed_reads, 250);
        assert_eq!(seen.load(Ordering::SeqCst), 250);
    }
}
