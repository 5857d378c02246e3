use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalised box in frame fractions, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Linear blend towards `other`; `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(&self, other: &BoundingBox, t: f64) -> BoundingBox {
        BoundingBox {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            w: lerp(self.w, other.w, t),
            h: lerp(self.h, other.h, t),
        }
    }

    /// Clamp every component into `[0, 1]`.
    pub fn clamped(&self) -> BoundingBox {
        BoundingBox {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
            w: self.w.clamp(0.0, 1.0),
            h: self.h.clamp(0.0, 1.0),
        }
    }

    pub fn components(&self) -> [(&'static str, f64); 4] {
        [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h)]
    }
}

/// Exact linear interpolation; returns `b` bit-for-bit at `t = 1`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t >= 1.0 {
        b
    } else if t <= 0.0 {
        a
    } else {
        a + (b - a) * t
    }
}

/// Physical camera output a detection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedId {
    Live,
    Manipulated,
}

impl FeedId {
    pub const ALL: [FeedId; 2] = [FeedId::Live, FeedId::Manipulated];

    pub fn label(self) -> &'static str {
        match self {
            FeedId::Live => "live",
            FeedId::Manipulated => "manipulated",
        }
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FeedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(FeedId::Live),
            "manipulated" => Ok(FeedId::Manipulated),
            other => Err(format!("unknown feed {other:?} (expected live or manipulated)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub id: String,
    pub feed: FeedId,
    pub bbox: BoundingBox,
    pub confidence: f64,
    pub is_target: bool,
}

/// Delivery hint carried on the wire. Playback itself is classified from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Mp4,
    Youtube,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(rename = "type")]
    pub kind: FeedType,
    pub url: String,
}

impl Feed {
    pub fn mp4(url: impl Into<String>) -> Self {
        Self {
            kind: FeedType::Mp4,
            url: url.into(),
        }
    }

    pub fn youtube(url: impl Into<String>) -> Self {
        Self {
            kind: FeedType::Youtube,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feeds {
    pub live: Feed,
    pub manipulated: Feed,
}

impl Feeds {
    pub fn get(&self, feed: FeedId) -> &Feed {
        match feed {
            FeedId::Live => &self.live,
            FeedId::Manipulated => &self.manipulated,
        }
    }
}

/// Subject being searched for. `confidence` is the match score, independent of
/// per-detection confidences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub portrait_url: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
}

impl CameraStatus {
    pub fn is_online(self) -> bool {
        matches!(self, CameraStatus::Online)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraMeta {
    pub camera_id: String,
    pub camera_name: String,
    pub location: String,
    pub status: CameraStatus,
    #[serde(serialize_with = "whole_number")]
    pub latency_ms: f64,
    #[serde(serialize_with = "whole_number")]
    pub fps: f64,
    pub resolution: String,
    /// Vendor-specific fields, passed through untouched.
    pub device: Map<String, Value>,
}

/// Integral readings go out as JSON integers (`97`, not `97.0`).
fn whole_number<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// One complete telemetry frame covering both feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub timestamp: String,
    pub feeds: Feeds,
    pub target: Target,
    pub camera_meta: CameraMeta,
    pub detections: Vec<Detection>,
}

impl DashboardSnapshot {
    pub fn detections_for(&self, feed: FeedId) -> impl Iterator<Item = &Detection> {
        self.detections.iter().filter(move |d| d.feed == feed)
    }
}
