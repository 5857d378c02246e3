use thiserror::Error;

/// Reasons a dashboard payload is rejected before it reaches the view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error("{path} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        path: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{path} is not a finite number")]
    NotFinite { path: String },
    #[error("{path} is not an ISO-8601 timestamp: {value:?}")]
    Timestamp { path: String, value: String },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}
