//! Video feed adapters.
//!
//! A feed URL is classified into one of three delivery mechanisms, each with
//! its own playback lifecycle. The adapter exposes one uniform status no
//! matter which mechanism is behind it.
//!
//! - `kind`: URL classification and embed id extraction.
//! - `host`: the playback environment the adapter drives.
//! - `timers`: deadline queue for reveal/restart/poll delays.
//! - `lifecycle`: one handler per feed kind.
//! - `adapter`: the per-feed state machine and event queue.

pub mod adapter;
pub mod host;
pub mod kind;
pub mod lifecycle;
pub mod timers;

pub use adapter::{AdapterConfig, FeedAdapter, FeedEvent, FeedState, SurfaceStatus};
pub use host::{FilePlayback, HeadlessHost, PlaybackError, PlaybackHost, PlayerHandle};
pub use kind::{FeedKind, embedded_video_id};
pub use lifecycle::EmbedMode;
pub use timers::{TimerKind, TimerQueue};
