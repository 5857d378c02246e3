//! Deterministic simulator for scripted demonstrations.
//!
//! No randomness: target confidence is fixed, the camera never drops, and
//! latency is a hash of a 3 s time bucket so every run looks the same.

use std::sync::Arc;

use hud_model::{CameraStatus, DashboardSnapshot, Feed, Feeds, Target};

use crate::{Clock, SnapshotGenerator, clock::iso_timestamp, identity};

pub const DEMO_CONFIDENCE: f64 = 0.93;
pub const DEMO_LABEL: &str = "VIP1";
pub const LATENCY_BUCKET_MS: u64 = 3_000;
pub const LATENCY_BASE_MS: f64 = 42.0;
pub const LATENCY_SPAN_MS: f64 = 85.0;

pub const DEMO_LIVE_URL: &str = "https://www.youtube.com/embed/G8PIodyHClU?autoplay=1&loop=1&playlist=G8PIodyHClU&mute=1&controls=0&modestbranding=1&disablekb=1&iv_load_policy=3&rel=0&fs=0&playsinline=1&enablejsapi=1";
pub const DEMO_MANIPULATED_URL: &str = "https://www.youtube.com/embed/PMCpqU7_Q5U?autoplay=1&loop=1&playlist=G8PIodyHClU&mute=1&controls=0&modestbranding=1&disablekb=1&iv_load_policy=3&rel=0&fs=0&playsinline=1&enablejsapi=1";

pub struct DemoSimulator {
    clock: Arc<dyn Clock>,
    portrait_url: String,
}

impl DemoSimulator {
    pub fn new(portrait_url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            portrait_url: portrait_url.into(),
        }
    }
}

/// Pseudo-random latency, constant within each 3 s bucket, in `[42, 127)`.
pub fn demo_latency_ms(now_ms: u64) -> u32 {
    let bucket = (now_ms / LATENCY_BUCKET_MS) as f64;
    // `%` keeps the sign of the dividend, so this lands in (-1, 1).
    let noise = ((bucket * 78.233).sin() * 43_758.545_3) % 1.0;
    (LATENCY_BASE_MS + noise.abs() * LATENCY_SPAN_MS).floor() as u32
}

impl SnapshotGenerator for DemoSimulator {
    fn generate(&mut self) -> DashboardSnapshot {
        let now = self.clock.now_ms();
        DashboardSnapshot {
            timestamp: iso_timestamp(now),
            feeds: Feeds {
                live: Feed::youtube(DEMO_LIVE_URL),
                manipulated: Feed::youtube(DEMO_MANIPULATED_URL),
            },
            target: Target {
                portrait_url: self.portrait_url.clone(),
                confidence: DEMO_CONFIDENCE,
                label: Some(DEMO_LABEL.to_string()),
            },
            camera_meta: identity::camera_meta(
                CameraStatus::Online,
                demo_latency_ms(now),
                identity::demo_device(),
            ),
            detections: Vec::new(),
        }
    }
}
