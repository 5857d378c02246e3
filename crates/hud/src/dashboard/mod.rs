//! Dashboard back end: snapshot polling, feed monitoring and the HTTP surface.
//!
//! - `config`: CLI/env configuration and the data mode.
//! - `scheduler`: refresh intervals and retry backoff.
//! - `source`: the snapshot source abstraction and fetch errors.
//! - `client`: backend client for api mode.
//! - `store`: latest snapshot, request generations and the consumer view.
//! - `poller`: fetch with retry and fallback.
//! - `feeds`: per-feed playback adapters.
//! - `service`: wiring, poll loop and shutdown.
//! - `server`: Actix Web routes.
//! - `telemetry`: tracing subscriber and Prometheus recorder.

pub use config::{ConfigArgs, DashboardConfig, DataMode, TelemetryOptions};
pub use poller::{Pause, PollOutcome, Poller};
pub use service::{DashboardHandle, poll_single, wait_for_ctrl_c};
pub use source::{FetchError, SnapshotSource};
pub use store::{DashboardView, SnapshotStore};

pub mod client;
pub mod config;
pub mod feeds;
pub mod poller;
pub mod scheduler;
pub mod server;
pub mod service;
pub mod source;
pub mod store;
pub mod telemetry;
