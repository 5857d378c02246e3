//! Telemetry simulators used when no live backend is attached.
//!
//! - `clock`: injectable wall clock (system and manual).
//! - `motion`: per-detection waypoint interpolation.
//! - `health`: camera online/offline toggling.
//! - `mock`: randomised simulator with moving detections.
//! - `demo`: deterministic simulator for scripted demonstrations.

pub mod clock;
pub mod demo;
pub mod health;
pub mod identity;
pub mod mock;
pub mod motion;

pub use clock::{Clock, ManualClock, SystemClock};
pub use demo::DemoSimulator;
pub use mock::{MockConfig, MockSimulator};

use hud_model::DashboardSnapshot;

/// Anything able to fabricate a complete snapshot on demand.
///
/// Implementations are single-writer: callers sharing one across threads must
/// serialise access themselves.
pub trait SnapshotGenerator: Send {
    fn generate(&mut self) -> DashboardSnapshot;
}
