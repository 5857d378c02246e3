/// Delay before an embedded player is revealed, and before it restarts after
/// reaching the end.
pub const REVEAL_DELAY_MS: u64 = 1_000;
/// Poll cadence while waiting for the embedded player runtime.
pub const RUNTIME_POLL_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Reveal,
    Restart,
    RuntimePoll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Timer {
    kind: TimerKind,
    deadline_ms: u64,
}

/// Pending one-shot timers for a single feed.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn schedule(&mut self, kind: TimerKind, deadline_ms: u64) {
        self.timers.push(Timer { kind, deadline_ms });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|timer| timer.kind != kind);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|timer| timer.kind == kind)
    }

    /// Remove and return the earliest timer due at `now_ms`, with its deadline.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerKind, u64)> {
        let (idx, timer) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline_ms <= now_ms)
            .min_by_key(|(idx, timer)| (timer.deadline_ms, *idx))?;
        let fired = (timer.kind, timer.deadline_ms);
        self.timers.remove(idx);
        Some(fired)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.deadline_ms).min()
    }
}
