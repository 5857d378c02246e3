use std::time::Duration;

use crate::dashboard::config::DataMode;

/// Demo mode polls quickly while the first frames settle, then slows down.
pub const DEMO_WARMUP_MS: u64 = 2_000;
pub const DEMO_WARMUP_INTERVAL: Duration = Duration::from_millis(500);
pub const DEMO_INTERVAL: Duration = Duration::from_millis(2_000);
pub const MOCK_INTERVAL: Duration = Duration::from_millis(800);
pub const API_INTERVAL: Duration = Duration::from_millis(2_000);

/// Refresh interval for `mode` once `elapsed_ms` have passed since mount.
pub fn refetch_interval(mode: DataMode, elapsed_ms: u64) -> Duration {
    match mode {
        DataMode::Demo if elapsed_ms < DEMO_WARMUP_MS => DEMO_WARMUP_INTERVAL,
        DataMode::Demo => DEMO_INTERVAL,
        DataMode::Mock => MOCK_INTERVAL,
        DataMode::Api => API_INTERVAL,
    }
}

/// Tracks the mount time that the demo warm-up is measured from.
#[derive(Clone, Debug)]
pub struct RefreshScheduler {
    mode: DataMode,
    mounted_at_ms: Option<u64>,
}

impl RefreshScheduler {
    pub fn new(mode: DataMode) -> Self {
        Self {
            mode,
            mounted_at_ms: None,
        }
    }

    pub fn mount(&mut self, now_ms: u64) {
        self.mounted_at_ms = Some(now_ms);
    }

    pub fn unmount(&mut self) {
        self.mounted_at_ms = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted_at_ms.is_some()
    }

    /// `None` means do not poll.
    pub fn next_interval(&self, now_ms: u64) -> Option<Duration> {
        let mounted_at = self.mounted_at_ms?;
        Some(refetch_interval(self.mode, now_ms.saturating_sub(mounted_at)))
    }
}

/// Exponential backoff between retries of one fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt`, counting from zero:
    /// `min(base * 2^attempt, max)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn interval_table() {
        assert_eq!(refetch_interval(DataMode::Demo, 0), Duration::from_millis(500));
        assert_eq!(refetch_interval(DataMode::Demo, 1_000), Duration::from_millis(500));
        assert_eq!(refetch_interval(DataMode::Demo, 1_999), Duration::from_millis(500));
        assert_eq!(refetch_interval(DataMode::Demo, 2_000), Duration::from_millis(2_000));
        assert_eq!(refetch_interval(DataMode::Demo, 2_001), Duration::from_millis(2_000));
        assert_eq!(refetch_interval(DataMode::Mock, 0), Duration::from_millis(800));
        assert_eq!(refetch_interval(DataMode::Mock, 60_000), Duration::from_millis(800));
        assert_eq!(refetch_interval(DataMode::Api, 0), Duration::from_millis(2_000));
    }

    #[test]
    fn unmounted_scheduler_does_not_poll() {
        let mut scheduler = RefreshScheduler::new(DataMode::Demo);
        assert_eq!(scheduler.next_interval(10), None);

        scheduler.mount(10_000);
        assert_eq!(scheduler.next_interval(11_000), Some(Duration::from_millis(500)));
        assert_eq!(scheduler.next_interval(12_001), Some(Duration::from_millis(2_000)));

        scheduler.unmount();
        assert_eq!(scheduler.next_interval(13_000), None);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..6).map(|n| policy.delay(n).as_millis() as u64).collect();
        assert_eq!(delays, [1_000, 2_000, 4_000, 8_000, 10_000, 10_000]);
        assert_eq!(policy.delay(40), Duration::from_millis(10_000));
    }

    proptest! {
        #[test]
        fn backoff_is_monotone_and_bounded(attempt in 0u32..64) {
            let policy = RetryPolicy::default();
            prop_assert!(policy.delay(attempt) <= policy.max_delay);
            prop_assert!(policy.delay(attempt) <= policy.delay(attempt + 1));
        }

        #[test]
        fn demo_interval_never_speeds_up(a in 0u64..10_000, b in 0u64..10_000) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                refetch_interval(DataMode::Demo, early) <= refetch_interval(DataMode::Demo, late)
            );
        }
    }
}
