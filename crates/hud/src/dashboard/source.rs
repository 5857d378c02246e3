use hud_model::{DashboardSnapshot, ValidationError};
use telemetry_sim::SnapshotGenerator;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or a non-success status.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response arrived but is not a valid snapshot.
    #[error("invalid snapshot: {0}")]
    Validation(#[from] ValidationError),
}

impl FetchError {
    /// Malformed payloads will not fix themselves on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Validation(_) => "validation",
        }
    }
}

/// Produces one validated snapshot per call.
pub trait SnapshotSource: Send {
    fn fetch(&mut self) -> Result<DashboardSnapshot, FetchError>;

    fn describe(&self) -> String;
}

/// Adapts a local simulator into a source that never fails.
pub struct SimulatedSource<G> {
    name: &'static str,
    generator: G,
}

impl<G: SnapshotGenerator> SimulatedSource<G> {
    pub fn new(name: &'static str, generator: G) -> Self {
        Self { name, generator }
    }
}

impl<G: SnapshotGenerator> SnapshotSource for SimulatedSource<G> {
    fn fetch(&mut self) -> Result<DashboardSnapshot, FetchError> {
        Ok(self.generator.generate())
    }

    fn describe(&self) -> String {
        format!("{} simulator", self.name)
    }
}
