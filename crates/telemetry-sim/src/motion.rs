//! Waypoint motion for simulated detections.
//!
//! Each tracked detection walks between randomly drawn waypoints. The position
//! at any instant is a pure function of the two waypoints, the segment start
//! time, and `now`, so sampling frequency never changes the path.

use hud_model::{BoundingBox, Detection, snapshot::lerp};
use rand::Rng;

/// Time to travel from one waypoint to the next.
pub const MOTION_DURATION_MS: u64 = 2_000;

/// Maximum positional step per waypoint, applied as `U(-STEP/2, STEP/2)`.
pub const POSITION_STEP: f64 = 0.15;
pub const SIZE_STEP: f64 = 0.03;
pub const CONFIDENCE_STEP: f64 = 0.2;

pub const X_RANGE: (f64, f64) = (0.05, 0.85);
pub const Y_RANGE: (f64, f64) = (0.05, 0.75);
/// Upper bounds keep `x + w` and `y + h` inside the frame.
pub const W_RANGE: (f64, f64) = (0.02, 0.15);
pub const H_RANGE: (f64, f64) = (0.02, 0.25);
pub const CONFIDENCE_RANGE: (f64, f64) = (0.3, 0.95);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub bbox: BoundingBox,
    pub confidence: f64,
}

impl Waypoint {
    pub fn of(detection: &Detection) -> Self {
        Self {
            bbox: detection.bbox,
            confidence: detection.confidence,
        }
    }
}

/// Segment progress clamped into `[0, 1]`.
pub fn progress(now_ms: u64, start_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    let elapsed = now_ms.saturating_sub(start_ms) as f64;
    (elapsed / duration_ms as f64).min(1.0)
}

/// Position on the `from → to` segment at `now_ms`.
pub fn interpolate(from: &Waypoint, to: &Waypoint, now_ms: u64, start_ms: u64) -> Waypoint {
    let t = progress(now_ms, start_ms, MOTION_DURATION_MS);
    Waypoint {
        bbox: from.bbox.lerp(&to.bbox, t),
        confidence: lerp(from.confidence, to.confidence, t),
    }
}

/// Draw the next waypoint by perturbing `from` and clamping into the walk bounds.
pub fn next_waypoint<R: Rng + ?Sized>(from: &Waypoint, rng: &mut R) -> Waypoint {
    let jitter = |rng: &mut R, step: f64| rng.random_range(-step / 2.0..step / 2.0);
    let bbox = BoundingBox {
        x: clamp(from.bbox.x + jitter(rng, POSITION_STEP), X_RANGE),
        y: clamp(from.bbox.y + jitter(rng, POSITION_STEP), Y_RANGE),
        w: clamp(from.bbox.w + jitter(rng, SIZE_STEP), W_RANGE),
        h: clamp(from.bbox.h + jitter(rng, SIZE_STEP), H_RANGE),
    };
    Waypoint {
        bbox,
        confidence: clamp(from.confidence + jitter(rng, CONFIDENCE_STEP), CONFIDENCE_RANGE),
    }
}

fn clamp(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

/// Motion state for one tracked detection.
#[derive(Debug, Clone)]
pub struct MotionModel {
    detection: Detection,
    from: Waypoint,
    to: Waypoint,
    start_ms: u64,
}

impl MotionModel {
    pub fn new<R: Rng + ?Sized>(detection: Detection, now_ms: u64, rng: &mut R) -> Self {
        let from = Waypoint::of(&detection);
        let to = next_waypoint(&from, rng);
        Self {
            detection,
            from,
            to,
            start_ms: now_ms,
        }
    }

    /// Build with an explicit segment, mainly for tests.
    pub fn with_segment(detection: Detection, to: Waypoint, start_ms: u64) -> Self {
        let from = Waypoint::of(&detection);
        Self {
            detection,
            from,
            to,
            start_ms,
        }
    }

    pub fn id(&self) -> &str {
        &self.detection.id
    }

    pub fn from(&self) -> &Waypoint {
        &self.from
    }

    pub fn to(&self) -> &Waypoint {
        &self.to
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// Sample the detection at `now_ms`. When the segment completes, the
    /// reached point becomes the next segment start and a new target is drawn.
    pub fn advance<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Detection {
        let t = progress(now_ms, self.start_ms, MOTION_DURATION_MS);
        let current = interpolate(&self.from, &self.to, now_ms, self.start_ms);

        if t >= 1.0 {
            self.from = current;
            self.to = next_waypoint(&current, rng);
            self.start_ms = now_ms;
        }

        self.detection.bbox = current.bbox.clamped();
        self.detection.confidence = current.confidence.clamp(0.0, 1.0);
        self.detection.clone()
    }
}

#[cfg(test)]
mod tests {
    use hud_model::FeedId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn detection() -> Detection {
        Detection {
            id: "d-live-1".into(),
            feed: FeedId::Live,
            bbox: BoundingBox::new(0.40, 0.20, 0.10, 0.20),
            confidence: 0.60,
            is_target: true,
        }
    }

    fn target() -> Waypoint {
        Waypoint {
            bbox: BoundingBox::new(0.50, 0.30, 0.12, 0.22),
            confidence: 0.80,
        }
    }

    #[test]
    fn progress_clamps_both_ends() {
        assert_eq!(progress(900, 1_000, 2_000), 0.0);
        assert_eq!(progress(2_000, 1_000, 2_000), 0.5);
        assert_eq!(progress(9_000, 1_000, 2_000), 1.0);
    }

    #[test]
    fn sample_at_segment_start_is_previous_waypoint() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut model = MotionModel::with_segment(detection(), target(), 10_000);
        let sampled = model.advance(10_000, &mut rng);
        assert_eq!(sampled.bbox, detection().bbox);
        assert_eq!(sampled.confidence, detection().confidence);
    }

    #[test]
    fn sample_at_segment_end_is_target_and_rolls_over() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut model = MotionModel::with_segment(detection(), target(), 10_000);
        let sampled = model.advance(12_000, &mut rng);
        assert_eq!(sampled.bbox, target().bbox);
        assert_eq!(sampled.confidence, target().confidence);
        assert_eq!(model.from(), &target());
        assert_eq!(model.start_ms(), 12_000);
    }

    #[test]
    fn midpoint_is_exact_linear_blend() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut model = MotionModel::with_segment(detection(), target(), 0);
        let sampled = model.advance(500, &mut rng);
        let t = 0.25;
        assert_eq!(sampled.bbox.x, 0.40 + (0.50 - 0.40) * t);
        assert_eq!(sampled.bbox.h, 0.20 + (0.22 - 0.20) * t);
        assert_eq!(sampled.confidence, 0.60 + (0.80 - 0.60) * t);
        // Mid-segment samples never move the segment.
        assert_eq!(model.start_ms(), 0);
        assert_eq!(model.from(), &Waypoint::of(&detection()));
    }

    #[test]
    fn identity_fields_survive_motion() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut model = MotionModel::new(detection(), 0, &mut rng);
        for step in 1..50 {
            let d = model.advance(step * 700, &mut rng);
            assert_eq!(d.id, "d-live-1");
            assert_eq!(d.feed, FeedId::Live);
            assert!(d.is_target);
        }
    }
}
