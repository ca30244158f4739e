//! Rolling per-minute generation quota.

use std::time::Duration;

use tokio::time::Instant;

/// Length of one quota window.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Counts generations inside a fixed-length window that restarts once it expires.
#[derive(Debug, Clone)]
pub struct GenerationQuota {
    window_start: Option<Instant>,
    count_in_window: u32,
    max_per_minute: u32,
    enabled: bool,
}

impl GenerationQuota {
    pub fn new(max_per_minute: u32, enabled: bool) -> Self {
        Self {
            window_start: None,
            count_in_window: 0,
            max_per_minute,
            enabled,
        }
    }

    /// A quota that never limits.
    pub fn unlimited() -> Self {
        Self::new(u32::MAX, false)
    }

    /// Roll the window if it has expired, then report whether another
    /// generation fits.
    pub fn check(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        if let Some(start) = self.window_start {
            if now.saturating_duration_since(start) > QUOTA_WINDOW {
                self.count_in_window = 0;
                self.window_start = Some(now);
            }
        }
        self.count_in_window < self.max_per_minute
    }

    /// Take one slot in the current window.
    pub fn record(&mut self, now: Instant) {
        if self.count_in_window == 0 {
            self.window_start = Some(now);
        }
        self.count_in_window = self.count_in_window.saturating_add(1);
    }

    /// Give back a slot taken at `taken_at` for a generation that produced
    /// no image. A no-op once the window has restarted since then.
    pub fn release(&mut self, taken_at: Instant) {
        if self.window_start.is_some_and(|start| start <= taken_at) {
            self.count_in_window = self.count_in_window.saturating_sub(1);
        }
    }

    pub fn count_in_window(&self) -> u32 {
        self.count_in_window
    }

    pub fn max_per_minute(&self) -> u32 {
        self.max_per_minute
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_then_blocks() {
        let start = Instant::now();
        let mut quota = GenerationQuota::new(3, true);
        for i in 0..3 {
            let now = start + Duration::from_millis(i * 10);
            assert!(quota.check(now));
            quota.record(now);
        }
        assert!(!quota.check(start + Duration::from_secs(30)));
        assert_eq!(quota.count_in_window(), 3);
    }

    #[test]
    fn window_rolls_over_after_sixty_seconds() {
        let start = Instant::now();
        let mut quota = GenerationQuota::new(1, true);
        assert!(quota.check(start));
        quota.record(start);

        // Exactly 60s is still inside the window.
        assert!(!quota.check(start + QUOTA_WINDOW));
        assert!(quota.check(start + QUOTA_WINDOW + Duration::from_millis(1)));
        assert_eq!(quota.count_in_window(), 0);
    }

    #[test]
    fn window_starts_at_first_generation() {
        let start = Instant::now();
        let mut quota = GenerationQuota::new(2, true);
        let first = start + Duration::from_secs(10);
        quota.record(first);
        quota.record(first + Duration::from_secs(5));
        // 65s after `start` but only 55s after the first generation.
        assert!(!quota.check(start + Duration::from_secs(65)));
        assert!(quota.check(start + Duration::from_secs(71)));
    }

    #[test]
    fn released_slot_can_be_taken_again() {
        let now = Instant::now();
        let mut quota = GenerationQuota::new(1, true);
        quota.record(now);
        assert!(!quota.check(now));
        quota.release(now);
        assert!(quota.check(now));
        assert_eq!(quota.count_in_window(), 0);
    }

    #[test]
    fn release_after_rollover_leaves_new_window_alone() {
        let start = Instant::now();
        let mut quota = GenerationQuota::new(2, true);
        quota.record(start);

        let later = start + QUOTA_WINDOW + Duration::from_secs(1);
        assert!(quota.check(later));
        quota.record(later);
        quota.release(start);
        assert_eq!(quota.count_in_window(), 1);
    }

    #[test]
    fn disabled_quota_never_blocks() {
        let now = Instant::now();
        let mut quota = GenerationQuota::new(1, false);
        for _ in 0..5 {
            assert!(quota.check(now));
            quota.record(now);
        }
    }
}
