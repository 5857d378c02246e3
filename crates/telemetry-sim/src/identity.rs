//! Static camera identity shared by both simulators.

use hud_model::{CameraMeta, CameraStatus};
use serde_json::{Map, Value, json};

pub const CAMERA_ID: &str = "R-39-F-003";
pub const CAMERA_NAME: &str = "CAM 41A";
pub const LOCATION: &str = "Terminal 2 / Concourse F";
pub const RESOLUTION: &str = "1920x1080";
pub const FPS: f64 = 30.0;

pub(crate) fn camera_meta(status: CameraStatus, latency_ms: u32, device: Value) -> CameraMeta {
    CameraMeta {
        camera_id: CAMERA_ID.to_string(),
        camera_name: CAMERA_NAME.to_string(),
        location: LOCATION.to_string(),
        status,
        latency_ms: f64::from(latency_ms),
        fps: FPS,
        resolution: RESOLUTION.to_string(),
        device: into_map(device),
    }
}

pub(crate) fn mock_device() -> Value {
    json!({
        "model": "AXIS Q3517-LVE",
        "firmware": "11.6.92",
        "ip": "10.0.12.44",
        "codec": "H.264",
        "lens": "f/1.4 3-9mm",
        "irMode": "Auto",
    })
}

pub(crate) fn demo_device() -> Value {
    json!({
        "model": "Demo Camera",
        "firmware": "1.0.0",
        "ip": "localhost",
        "codec": "H.264",
        "lens": "Built-in",
        "irMode": "Auto",
    })
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Inline SVG silhouette used when no portrait is configured.
pub fn placeholder_portrait() -> String {
    const SVG_BASE64: &str = "PHN2ZyB3aWR0aD0iMjAwIiBoZWlnaHQ9IjIwMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iMjAwIiBoZWlnaHQ9IjIwMCIgZmlsbD0iIzFhMWYyNiIvPjxjaXJjbGUgY3g9IjEwMCIgY3k9IjgwIiByPSIzNSIgZmlsbD0iIzAwZmY5ZCIgb3BhY2l0eT0iMC4zIi8+PHBhdGggZD0iTSA1MCAxNTAgUSAxMDAgMTIwIDE1MCAxNTAgTCAxNTAgMjAwIEwgNTAgMjAwIFoiIGZpbGw9IiMwMGZmOWQiIG9wYWNpdHk9IjAuMyIvPjwvc3ZnPg==";
    format!("data:image/svg+xml;base64,{SVG_BASE64}")
}
