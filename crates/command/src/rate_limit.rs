//! Per-actor command rate limiting over a fixed one-minute window.

use {dashmap::DashMap, uuid::Uuid};

const WINDOW_MS: u64 = 60_000;

struct UsageWindow {
    count: u32,
    reset_at_ms: u64,
}

/// Allows up to `max_per_minute` command executions per actor. The window
/// is fixed, not sliding: the reset timestamp is set on the first use and
/// counts accumulate until it passes.
pub struct CommandRateLimiter {
    max_per_minute: u32,
    windows: DashMap<Uuid, UsageWindow>,
}

impl CommandRateLimiter {
    #[must_use]
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_minute: max_per_minute.max(1),
            windows: DashMap::new(),
        }
    }

    /// Record one use at `now_ms`; `true` means the command may run.
    #[must_use]
    pub fn check_at(&self, actor_id: Uuid, now_ms: u64) -> bool {
        let mut window = self.windows.entry(actor_id).or_insert_with(|| UsageWindow {
            count: 0,
            reset_at_ms: now_ms + WINDOW_MS,
        });
        if now_ms > window.reset_at_ms {
            window.count = 1;
            window.reset_at_ms = now_ms + WINDOW_MS;
            return true;
        }
        if window.count >= self.max_per_minute {
            return false;
        }
        window.count += 1;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn sixth_call_of_five_is_rejected() {
        let limiter = CommandRateLimiter::new(5);
        let actor = Uuid::new_v4();
        let now = 1_000_000;

        for _ in 0..5 {
            assert!(limiter.check_at(actor, now));
        }
        assert!(!limiter.check_at(actor, now));
    }

    #[test]
    fn window_resets_strictly_after_the_deadline() {
        let limiter = CommandRateLimiter::new(2);
        let actor = Uuid::new_v4();
        let now = 1_000_000;

        assert!(limiter.check_at(actor, now));
        assert!(limiter.check_at(actor, now));
        assert!(!limiter.check_at(actor, now));

        // Exactly at the deadline: still inside the window.
        assert!(!limiter.check_at(actor, now + WINDOW_MS));
        // One past it: fresh window.
        assert!(limiter.check_at(actor, now + WINDOW_MS + 1));
    }

    #[test]
    fn actors_are_limited_independently() {
        let limiter = CommandRateLimiter::new(1);
        let now = 1_000_000;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(limiter.check_at(a, now));
        assert!(!limiter.check_at(a, now));
        assert!(limiter.check_at(b, now));
    }
}
