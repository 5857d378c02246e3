//! Snapshot polling with retry, fallback and request generations.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use hud_model::DashboardSnapshot;
use telemetry_sim::SnapshotGenerator;
use tracing::{debug, error, info_span, warn};

use crate::dashboard::{
    config::DataMode,
    scheduler::RetryPolicy,
    source::{FetchError, SnapshotSource},
    store::{Applied, SharedStore, lock},
};

/// Sleeps between retries. Returns `false` when the wait was cut short by
/// shutdown and the fetch should be abandoned.
pub trait Pause: Send + Sync {
    fn pause(&self, delay: Duration) -> bool;
}

/// Waits on the shutdown channel; the channel closing ends the wait early.
pub struct ShutdownPause {
    shutdown: Receiver<()>,
}

impl ShutdownPause {
    pub fn new(shutdown: Receiver<()>) -> Self {
        Self { shutdown }
    }
}

impl Pause for ShutdownPause {
    fn pause(&self, delay: Duration) -> bool {
        matches!(
            self.shutdown.recv_timeout(delay),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A snapshot was applied; `fallback` marks a locally synthesised one.
    Applied { generation: u64, fallback: bool },
    /// A newer request landed first.
    Stale { generation: u64 },
    /// Nothing to show yet and every attempt failed.
    Failed { generation: u64 },
    /// Shutdown interrupted the retry backoff.
    Cancelled { generation: u64 },
}

impl PollOutcome {
    pub fn generation(self) -> u64 {
        match self {
            PollOutcome::Applied { generation, .. }
            | PollOutcome::Stale { generation }
            | PollOutcome::Failed { generation }
            | PollOutcome::Cancelled { generation } => generation,
        }
    }
}

enum FetchFailure {
    Exhausted(FetchError),
    Cancelled,
}

/// Owns the snapshot source and the fallback simulator. Safe to share: the
/// periodic loop and manual refreshes may call [`Poller::poll_once`]
/// concurrently and are ordered by request generation.
pub struct Poller {
    mode: DataMode,
    source: Mutex<Box<dyn SnapshotSource>>,
    fallback: Mutex<Box<dyn SnapshotGenerator>>,
    store: SharedStore,
    retry: RetryPolicy,
    pause: Box<dyn Pause>,
}

impl Poller {
    pub fn new(
        mode: DataMode,
        source: Box<dyn SnapshotSource>,
        fallback: Box<dyn SnapshotGenerator>,
        store: SharedStore,
        retry: RetryPolicy,
        pause: Box<dyn Pause>,
    ) -> Self {
        Self {
            mode,
            source: Mutex::new(source),
            fallback: Mutex::new(fallback),
            store,
            retry,
            pause,
        }
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn poll_once(&self) -> PollOutcome {
        let generation = lock(&self.store).begin_request();
        let span = info_span!("dashboard.poll", generation, mode = %self.mode);
        let _span_guard = span.enter();

        let started = Instant::now();
        let result = self.fetch_with_retry();
        metrics::histogram!("hud_fetch_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(snapshot) => {
                metrics::counter!("hud_fetch_total", "outcome" => "ok").increment(1);
                self.apply(generation, snapshot, false)
            }
            Err(FetchFailure::Cancelled) => {
                debug!("poll cancelled by shutdown");
                PollOutcome::Cancelled { generation }
            }
            Err(FetchFailure::Exhausted(err)) => {
                metrics::counter!("hud_fetch_total", "outcome" => err.kind()).increment(1);
                if lock(&self.store).has_snapshot() {
                    warn!(%err, "fetch failed, substituting a simulated snapshot");
                    metrics::counter!("hud_fallback_snapshots_total").increment(1);
                    let snapshot = lock(&self.fallback).generate();
                    self.apply(generation, snapshot, true)
                } else {
                    error!(%err, "fetch failed before any snapshot loaded");
                    lock(&self.store).fail(generation);
                    PollOutcome::Failed { generation }
                }
            }
        }
    }

    fn fetch_with_retry(&self) -> Result<DashboardSnapshot, FetchFailure> {
        let mut attempt = 0;
        loop {
            let result = lock(&self.source).fetch();
            match result {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    warn!(%err, attempt, delay_ms = delay.as_millis() as u64, "fetch failed, retrying");
                    metrics::counter!("hud_fetch_retries_total").increment(1);
                    if !self.pause.pause(delay) {
                        return Err(FetchFailure::Cancelled);
                    }
                }
                Err(err) => return Err(FetchFailure::Exhausted(err)),
            }
        }
    }

    fn apply(&self, generation: u64, snapshot: DashboardSnapshot, fallback: bool) -> PollOutcome {
        match lock(&self.store).apply(generation, snapshot) {
            Applied::Fresh => PollOutcome::Applied {
                generation,
                fallback,
            },
            Applied::Stale => {
                metrics::counter!("hud_stale_results_total").increment(1);
                PollOutcome::Stale { generation }
            }
        }
    }
}
