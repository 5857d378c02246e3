//! Snapshot types shared by the simulator, the poller, and the overlay renderer.
//!
//! Everything that crosses the wire is defined here together with the
//! validation that gates a payload before any consumer sees it.

pub mod error;
pub mod snapshot;
pub mod validate;

pub use error::ValidationError;
pub use snapshot::{
    BoundingBox, CameraMeta, CameraStatus, DashboardSnapshot, Detection, Feed, FeedId, FeedType,
    Feeds, Target,
};
