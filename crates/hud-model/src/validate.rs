//! Wire validation. A payload is decoded and range-checked as a whole; any
//! failure rejects the entire snapshot.

use chrono::{DateTime, NaiveDateTime};

use crate::{DashboardSnapshot, ValidationError};

const UNIT_RANGE: (f64, f64) = (0.0, 1.0);

impl DashboardSnapshot {
    /// Decode a raw JSON body and validate it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let snapshot: DashboardSnapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Validate an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let snapshot: DashboardSnapshot = serde_json::from_value(value)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the value constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_timestamp("timestamp", &self.timestamp)?;
        check_range("target.confidence", self.target.confidence, UNIT_RANGE)?;
        check_finite("cameraMeta.latencyMs", self.camera_meta.latency_ms)?;
        check_finite("cameraMeta.fps", self.camera_meta.fps)?;

        for (idx, detection) in self.detections.iter().enumerate() {
            for (name, value) in detection.bbox.components() {
                check_range(&format!("detections[{idx}].bbox.{name}"), value, UNIT_RANGE)?;
            }
            check_range(
                &format!("detections[{idx}].confidence"),
                detection.confidence,
                UNIT_RANGE,
            )?;
        }
        Ok(())
    }
}

fn check_finite(path: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            path: path.to_string(),
        })
    }
}

fn check_range(path: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    check_finite(path, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            path: path.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Accepts RFC 3339 plus the offset-less form produced by upstream Python
/// producers (`datetime.isoformat()`).
fn check_timestamp(path: &str, value: &str) -> Result<(), ValidationError> {
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    {
        Ok(())
    } else {
        Err(ValidationError::Timestamp {
            path: path.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_accepts_rfc3339_and_naive_iso() {
        assert!(check_timestamp("t", "2026-10-17T09:15:02.123Z").is_ok());
        assert!(check_timestamp("t", "2026-10-17T09:15:02+02:00").is_ok());
        assert!(check_timestamp("t", "2026-10-17T09:15:02.123456").is_ok());
        assert!(check_timestamp("t", "yesterday").is_err());
    }

    #[test]
    fn range_rejects_nan() {
        assert_eq!(
            check_range("c", f64::NAN, UNIT_RANGE),
            Err(ValidationError::NotFinite {
                path: "c".to_string()
            })
        );
    }
}
