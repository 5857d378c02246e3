use hud_model::{CameraStatus, DashboardSnapshot, FeedId, FeedType, ValidationError};
use serde_json::{Value, json};

fn sample() -> Value {
    json!({
        "timestamp": "2026-10-17T09:15:02.123Z",
        "feeds": {
            "live": { "type": "mp4", "url": "http://localhost:8080/api/video/live" },
            "manipulated": { "type": "youtube", "url": "https://www.youtube.com/embed/abc123" }
        },
        "target": { "portraitUrl": "/VIP1.jpg", "confidence": 0.93, "label": "VIP1" },
        "cameraMeta": {
            "cameraId": "R-39-F-003",
            "cameraName": "CAM 41A",
            "location": "Terminal 2 / Concourse F",
            "status": "online",
            "latencyMs": 97,
            "fps": 30,
            "resolution": "1920x1080",
            "device": { "model": "AXIS Q3517-LVE", "ir": { "mode": "Auto" } }
        },
        "detections": [
            {
                "id": "d-live-1",
                "feed": "live",
                "bbox": { "x": 0.42, "y": 0.18, "w": 0.10, "h": 0.22 },
                "confidence": 0.78,
                "isTarget": true
            }
        ]
    })
}

#[test]
fn accepts_well_formed_payload() {
    let snapshot = DashboardSnapshot::from_value(sample()).expect("valid snapshot");
    assert_eq!(snapshot.feeds.manipulated.kind, FeedType::Youtube);
    assert_eq!(snapshot.camera_meta.status, CameraStatus::Online);
    assert_eq!(snapshot.camera_meta.latency_ms, 97.0);
    assert_eq!(snapshot.detections_for(FeedId::Live).count(), 1);
    assert_eq!(snapshot.detections_for(FeedId::Manipulated).count(), 0);
    assert_eq!(snapshot.camera_meta.device["ir"]["mode"], "Auto");
}

#[test]
fn label_is_optional_and_omitted_when_absent() {
    let mut raw = sample();
    raw["target"].as_object_mut().unwrap().remove("label");
    let snapshot = DashboardSnapshot::from_value(raw).expect("label is optional");
    assert_eq!(snapshot.target.label, None);

    let encoded = serde_json::to_value(&snapshot).unwrap();
    assert!(encoded["target"].get("label").is_none());
    assert_eq!(encoded["detections"][0]["isTarget"], true);
    assert_eq!(encoded["cameraMeta"]["cameraId"], "R-39-F-003");
}

#[test]
fn rejects_unknown_feed_type() {
    let mut raw = sample();
    raw["feeds"]["live"]["type"] = json!("hls");
    assert!(matches!(
        DashboardSnapshot::from_value(raw),
        Err(ValidationError::Malformed(_))
    ));
}

#[test]
fn rejects_missing_camera_meta() {
    let mut raw = sample();
    raw.as_object_mut().unwrap().remove("cameraMeta");
    assert!(matches!(
        DashboardSnapshot::from_value(raw),
        Err(ValidationError::Malformed(_))
    ));
}

#[test]
fn rejects_bbox_outside_unit_square() {
    let mut raw = sample();
    raw["detections"][0]["bbox"]["w"] = json!(1.2);
    match DashboardSnapshot::from_value(raw) {
        Err(ValidationError::OutOfRange { path, value, .. }) => {
            assert_eq!(path, "detections[0].bbox.w");
            assert_eq!(value, 1.2);
        }
        other => panic!("expected out-of-range error, got {other:?}"),
    }
}

#[test]
fn rejects_target_confidence_above_one() {
    let mut raw = sample();
    raw["target"]["confidence"] = json!(1.01);
    assert!(matches!(
        DashboardSnapshot::from_value(raw),
        Err(ValidationError::OutOfRange { .. })
    ));
}

#[test]
fn rejects_unparseable_timestamp() {
    let mut raw = sample();
    raw["timestamp"] = json!("17/10/2026");
    assert!(matches!(
        DashboardSnapshot::from_value(raw),
        Err(ValidationError::Timestamp { .. })
    ));
}

#[test]
fn decodes_from_raw_bytes() {
    let bytes = serde_json::to_vec(&sample()).unwrap();
    assert!(DashboardSnapshot::from_slice(&bytes).is_ok());
    assert!(DashboardSnapshot::from_slice(b"{\"timestamp\":").is_err());
}

#[test]
fn whole_number_readings_encode_as_integers() {
    let mut snapshot = DashboardSnapshot::from_value(sample()).expect("valid snapshot");
    let encoded = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(encoded["cameraMeta"]["latencyMs"], json!(97));
    assert!(encoded["cameraMeta"]["fps"].is_i64());

    snapshot.camera_meta.latency_ms = 97.5;
    let encoded = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(encoded["cameraMeta"]["latencyMs"], json!(97.5));
}
