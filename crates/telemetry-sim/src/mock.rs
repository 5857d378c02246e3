//! Randomised telemetry simulator.
//!
//! Produces moving detections, a wandering target-match confidence, periodic
//! camera dropouts and jittered latency. All state lives in the simulator
//! value; callers own it and pass it to whoever polls it.

use std::{ops::Range, sync::Arc};

use hud_model::{BoundingBox, DashboardSnapshot, Detection, Feed, FeedId, Feeds, Target};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    Clock, SnapshotGenerator,
    health::CameraHealth,
    identity::{self, placeholder_portrait},
    motion::MotionModel,
};

pub const INITIAL_BASE_CONFIDENCE: f64 = 0.20;
pub const BASE_CONFIDENCE_RANGE: (f64, f64) = (0.15, 0.35);
/// Width of the uniform step applied to the target confidence each snapshot.
pub const BASE_CONFIDENCE_STEP: f64 = 0.05;
pub const LATENCY_RANGE_MS: Range<u32> = 80..120;
pub const TARGET_LABEL: &str = "UNKNOWN SUBJECT";

#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// File URL served for the live feed.
    pub live_url: String,
    /// File URL served for the manipulated feed.
    pub manipulated_url: String,
    /// Fixed RNG seed; `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

pub struct MockSimulator {
    clock: Arc<dyn Clock>,
    rng: ChaCha8Rng,
    tracks: Vec<MotionModel>,
    base_confidence: f64,
    health: CameraHealth,
    feeds: Feeds,
    portrait_url: String,
}

impl MockSimulator {
    pub fn new(config: MockConfig, clock: Arc<dyn Clock>) -> Self {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let now = clock.now_ms();
        let tracks = initial_detections()
            .into_iter()
            .map(|detection| MotionModel::new(detection, now, &mut rng))
            .collect();

        Self {
            clock,
            rng,
            tracks,
            base_confidence: INITIAL_BASE_CONFIDENCE,
            health: CameraHealth::new(now),
            feeds: Feeds {
                live: Feed::mp4(config.live_url),
                manipulated: Feed::mp4(config.manipulated_url),
            },
            portrait_url: placeholder_portrait(),
        }
    }

    pub fn base_confidence(&self) -> f64 {
        self.base_confidence
    }

    pub fn tracks(&self) -> &[MotionModel] {
        &self.tracks
    }

    fn step_base_confidence(&mut self) -> f64 {
        let half = BASE_CONFIDENCE_STEP / 2.0;
        let (min, max) = BASE_CONFIDENCE_RANGE;
        self.base_confidence =
            (self.base_confidence + self.rng.random_range(-half..half)).clamp(min, max);
        self.base_confidence
    }
}

impl SnapshotGenerator for MockSimulator {
    fn generate(&mut self) -> DashboardSnapshot {
        let now = self.clock.now_ms();
        let status = self.health.update(now);
        let confidence = self.step_base_confidence();
        let latency_ms = self.rng.random_range(LATENCY_RANGE_MS);

        let rng = &mut self.rng;
        let detections = self
            .tracks
            .iter_mut()
            .map(|track| track.advance(now, rng))
            .collect();

        DashboardSnapshot {
            timestamp: crate::clock::iso_timestamp(now),
            feeds: self.feeds.clone(),
            target: Target {
                portrait_url: self.portrait_url.clone(),
                confidence,
                label: Some(TARGET_LABEL.to_string()),
            },
            camera_meta: identity::camera_meta(status, latency_ms, identity::mock_device()),
            detections,
        }
    }
}

/// Fixed tracked set: one target and one bystander per feed.
pub fn initial_detections() -> Vec<Detection> {
    let detection = |id: &str, feed, bbox, confidence, is_target| Detection {
        id: id.to_string(),
        feed,
        bbox,
        confidence,
        is_target,
    };
    vec![
        detection(
            "d-live-1",
            FeedId::Live,
            BoundingBox::new(0.42, 0.18, 0.10, 0.22),
            0.78,
            true,
        ),
        detection(
            "d-manip-1",
            FeedId::Manipulated,
            BoundingBox::new(0.38, 0.20, 0.11, 0.23),
            0.72,
            true,
        ),
        detection(
            "d-live-2",
            FeedId::Live,
            BoundingBox::new(0.15, 0.45, 0.08, 0.18),
            0.65,
            false,
        ),
        detection(
            "d-manip-2",
            FeedId::Manipulated,
            BoundingBox::new(0.70, 0.35, 0.09, 0.20),
            0.58,
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use hud_model::{CameraStatus, FeedType};

    use super::*;
    use crate::ManualClock;

    fn simulator(clock: &ManualClock) -> MockSimulator {
        MockSimulator::new(
            MockConfig {
                live_url: "live.mp4".into(),
                manipulated_url: "manip.mp4".into(),
                seed: Some(42),
            },
            Arc::new(clock.clone()),
        )
    }

    #[test]
    fn first_snapshot_starts_at_initial_positions() {
        let clock = ManualClock::new(1_000_000);
        let mut sim = simulator(&clock);
        let snapshot = sim.generate();

        assert_eq!(snapshot.detections, initial_detections());
        assert_eq!(snapshot.feeds.live, Feed::mp4("live.mp4"));
        assert_eq!(snapshot.feeds.manipulated.kind, FeedType::Mp4);
        assert_eq!(snapshot.camera_meta.status, CameraStatus::Online);
        assert_eq!(snapshot.target.label.as_deref(), Some(TARGET_LABEL));
        assert!(snapshot.target.portrait_url.starts_with("data:image/svg+xml;base64,"));
        assert_eq!(snapshot.timestamp, "1970-01-01T00:16:40.000Z");
    }

    #[test]
    fn identity_is_stable_across_snapshots() {
        let clock = ManualClock::new(0);
        let mut sim = simulator(&clock);
        let ids: Vec<String> = sim.generate().detections.into_iter().map(|d| d.id).collect();
        for _ in 0..20 {
            clock.advance(800);
            let next: Vec<String> = sim.generate().detections.into_iter().map(|d| d.id).collect();
            assert_eq!(next, ids);
        }
    }

    #[test]
    fn same_seed_same_telemetry() {
        let clock_a = ManualClock::new(0);
        let clock_b = ManualClock::new(0);
        let mut a = simulator(&clock_a);
        let mut b = simulator(&clock_b);
        for _ in 0..10 {
            clock_a.advance(900);
            clock_b.advance(900);
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn snapshots_pass_wire_validation() {
        let clock = ManualClock::new(0);
        let mut sim = simulator(&clock);
        for _ in 0..200 {
            clock.advance(333);
            let snapshot = sim.generate();
            snapshot.validate().expect("simulated snapshot is valid");
        }
    }
}
