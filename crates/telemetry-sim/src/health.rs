use hud_model::CameraStatus;
use tracing::debug;

/// Online time before a simulated outage.
pub const ONLINE_PERIOD_MS: u64 = 15_000;
/// Length of a simulated outage.
pub const OUTAGE_MS: u64 = 2_000;

/// Periodic camera dropout: short outages after each long online stretch.
#[derive(Debug, Clone)]
pub struct CameraHealth {
    online: bool,
    last_toggle_ms: u64,
}

impl CameraHealth {
    pub fn new(now_ms: u64) -> Self {
        Self {
            online: true,
            last_toggle_ms: now_ms,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn last_toggle_ms(&self) -> u64 {
        self.last_toggle_ms
    }

    /// Evaluate the toggle rules at `now_ms` and return the resulting status.
    pub fn update(&mut self, now_ms: u64) -> CameraStatus {
        let since = now_ms.saturating_sub(self.last_toggle_ms);
        if self.online && since > ONLINE_PERIOD_MS {
            self.online = false;
            self.last_toggle_ms = now_ms;
            debug!(now_ms, "simulated camera dropped offline");
        } else if !self.online && since > OUTAGE_MS {
            self.online = true;
            self.last_toggle_ms = now_ms;
            debug!(now_ms, "simulated camera back online");
        }

        if self.online {
            CameraStatus::Online
        } else {
            CameraStatus::Offline
        }
    }
}
