//! Epoch-millisecond clock helpers.
//!
//! All readiness, cooldown, and rate-limit arithmetic in herald runs on
//! `u64` epoch milliseconds so it can be exercised in tests with synthetic
//! timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as epoch milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Seconds → milliseconds, saturating.
#[must_use]
pub const fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(1000)
}

/// Presentation ticks → milliseconds at the fixed 50 ms/tick ratio.
#[must_use]
pub const fn ticks_to_ms(ticks: u32) -> u64 {
    (ticks as u64).saturating_mul(50)
}
