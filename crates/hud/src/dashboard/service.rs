//! Dashboard supervisor: builds the snapshot source for the configured mode,
//! runs the poller thread, keeps the feed board in step and owns shutdown.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use telemetry_sim::{Clock, DemoSimulator, MockSimulator, SnapshotGenerator, SystemClock};
use tracing::{debug, info, warn};

use crate::dashboard::{
    client::ApiClient,
    config::{DashboardConfig, DataMode},
    feeds::{FeedBoard, FeedStatus},
    poller::{Pause, PollOutcome, Poller, ShutdownPause},
    scheduler::{RefreshScheduler, RetryPolicy},
    source::{SimulatedSource, SnapshotSource},
    store::{DashboardView, SharedStore, SnapshotStore, lock},
    telemetry,
};

pub type SharedFeeds = Arc<Mutex<FeedBoard>>;

/// Source for `config.mode`: one of the simulators, or the backend client.
pub fn build_source(
    config: &DashboardConfig,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn SnapshotSource>> {
    Ok(match config.mode {
        DataMode::Demo => Box::new(SimulatedSource::new(
            "demo",
            DemoSimulator::new(config.demo_portrait_url.clone(), clock),
        )),
        DataMode::Mock => Box::new(SimulatedSource::new(
            "mock",
            MockSimulator::new(config.mock.clone(), clock),
        )),
        DataMode::Api => Box::new(ApiClient::new(config)?),
    })
}

/// Simulator used when the primary source keeps failing.
pub fn build_fallback(config: &DashboardConfig, clock: Arc<dyn Clock>) -> Box<dyn SnapshotGenerator> {
    Box::new(MockSimulator::new(config.mock.clone(), clock))
}

/// Poller wired to `config` with a caller-supplied pause strategy.
pub fn build_poller(config: &DashboardConfig, pause: Box<dyn Pause>) -> Result<Poller> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = build_source(config, clock.clone())?;
    info!(mode = %config.mode, source = source.describe(), "snapshot source ready");
    Ok(Poller::new(
        config.mode,
        source,
        build_fallback(config, clock),
        SnapshotStore::shared(config.mode),
        RetryPolicy::default(),
        pause,
    ))
}

/// Running dashboard. Dropping the shutdown sender ends the poll loop and
/// interrupts any retry backoff in flight.
pub struct DashboardHandle {
    poller: Arc<Poller>,
    feeds: SharedFeeds,
    shutdown: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl DashboardHandle {
    pub fn start(config: &DashboardConfig) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let pause = Box::new(ShutdownPause::new(shutdown_rx.clone()));
        let poller = Arc::new(build_poller(config, pause)?);
        let feeds: SharedFeeds = Arc::new(Mutex::new(FeedBoard::headless()));

        let thread = telemetry::spawn_thread("dashboard-poller", {
            let poller = poller.clone();
            let feeds = feeds.clone();
            move || run_poll_loop(&poller, &feeds, &SystemClock, shutdown_rx)
        })
        .context("failed to spawn dashboard poller thread")?;

        Ok(Self {
            poller,
            feeds,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn mode(&self) -> DataMode {
        self.poller.mode()
    }

    pub fn store(&self) -> &SharedStore {
        self.poller.store()
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.poller
    }

    pub fn feeds(&self) -> &SharedFeeds {
        &self.feeds
    }

    pub fn view(&self) -> DashboardView {
        lock(self.poller.store()).view()
    }

    /// Fetch immediately, outside the periodic schedule. Blocks for the
    /// duration of the fetch including retries.
    pub fn refresh_now(&self) -> PollOutcome {
        self.poller.poll_once()
    }

    pub fn feed_statuses(&self) -> Vec<FeedStatus> {
        lock(&self.feeds).statuses()
    }

    /// Stop the poll loop, wait for it, and release the feed adapters.
    pub fn stop(mut self) {
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("dashboard poller thread panicked");
            }
        }
        lock(&self.feeds).teardown();
    }
}

/// Poll, follow feed URLs, sleep for the scheduled interval; repeat until the
/// shutdown channel closes.
pub fn run_poll_loop(
    poller: &Poller,
    feeds: &Mutex<FeedBoard>,
    clock: &dyn Clock,
    shutdown: Receiver<()>,
) {
    let mut scheduler = RefreshScheduler::new(poller.mode());
    scheduler.mount(clock.now_ms());

    loop {
        let outcome = poller.poll_once();
        debug!(?outcome, "poll finished");
        if matches!(outcome, PollOutcome::Cancelled { .. }) {
            break;
        }

        let now = clock.now_ms();
        let latest = lock(poller.store()).latest();
        if let Some(snapshot) = latest {
            lock(feeds).sync(&snapshot, now);
        }

        let Some(interval) = scheduler.next_interval(now) else {
            break;
        };
        metrics::gauge!("hud_poll_interval_ms").set(interval.as_millis() as f64);
        match shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    scheduler.unmount();
    debug!("poll loop stopped");
}

/// Block until Ctrl+C.
pub fn wait_for_ctrl_c() -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .context("failed to install Ctrl+C handler")?;
    rx.recv()
        .map_err(|_| anyhow!("Ctrl+C channel closed unexpectedly"))
}

/// Poll once without a background thread. Used by the one-shot subcommands.
pub fn poll_single(config: &DashboardConfig) -> Result<Arc<hud_model::DashboardSnapshot>> {
    struct Sleep;
    impl Pause for Sleep {
        fn pause(&self, delay: Duration) -> bool {
            thread::sleep(delay);
            true
        }
    }

    let poller = build_poller(config, Box::new(Sleep))?;
    let outcome = poller.poll_once();
    lock(poller.store())
        .latest()
        .ok_or_else(|| anyhow!("no snapshot available ({outcome:?})"))
}
