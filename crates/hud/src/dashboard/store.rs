use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hud_model::DashboardSnapshot;
use serde::Serialize;
use tracing::debug;

use crate::dashboard::config::DataMode;

pub type SharedStore = Arc<Mutex<SnapshotStore>>;

/// What a consumer of the dashboard sees.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub mode: DataMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Fresh,
    /// A newer request already landed.
    Stale,
}

/// Latest applied snapshot plus the request generations guarding it.
#[derive(Debug)]
pub struct SnapshotStore {
    mode: DataMode,
    snapshot: Option<Arc<DashboardSnapshot>>,
    issued: u64,
    applied: u64,
    revision: u64,
    failed: bool,
}

impl SnapshotStore {
    pub fn new(mode: DataMode) -> Self {
        Self {
            mode,
            snapshot: None,
            issued: 0,
            applied: 0,
            revision: 0,
            failed: false,
        }
    }

    pub fn shared(mode: DataMode) -> SharedStore {
        Arc::new(Mutex::new(Self::new(mode)))
    }

    /// Reserve the next request generation.
    pub fn begin_request(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn apply(&mut self, generation: u64, snapshot: DashboardSnapshot) -> Applied {
        if generation <= self.applied {
            debug!(generation, applied = self.applied, "discarding stale snapshot");
            return Applied::Stale;
        }
        self.applied = generation;
        self.snapshot = Some(Arc::new(snapshot));
        self.revision += 1;
        self.failed = false;
        Applied::Fresh
    }

    /// Record a request that produced nothing. Only surfaces as an error while
    /// no snapshot has ever been applied.
    pub fn fail(&mut self, generation: u64) {
        if self.snapshot.is_none() && generation > self.applied {
            self.failed = true;
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.snapshot.clone()
    }

    /// Bumped once per applied snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    pub fn view(&self) -> DashboardView {
        let is_error = self.failed && self.snapshot.is_none();
        DashboardView {
            snapshot: self.snapshot.clone(),
            is_loading: self.snapshot.is_none() && !is_error,
            is_error,
            mode: self.mode,
        }
    }
}

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
