//! Liveness probes.

use crate::streamer::Streamer;

/// Answers whether a streamer is live at `now_ms`. Real platform clients
/// would hold API credentials; the simulator below needs none.
pub trait LiveProbe: Send + Sync {
    fn is_live(&self, streamer: &Streamer, now_ms: u64) -> bool;
}

/// Deterministic pseudo-random liveness. Each platform uses a different
/// time quantum so the three don't flip in lockstep; lower
/// `change_probability` means more frequent flips.
pub struct SimulatedProbe {
    change_probability: u64,
}

impl SimulatedProbe {
    #[must_use]
    pub fn new(change_probability: u64) -> Self {
        Self {
            change_probability: change_probability.max(1),
        }
    }
}

impl LiveProbe for SimulatedProbe {
    fn is_live(&self, streamer: &Streamer, now_ms: u64) -> bool {
        let p = self.change_probability;
        let hash = name_hash(&streamer.id);
        match streamer.platform {
            crate::platform::Platform::Twitch => {
                (hash.wrapping_add(now_ms as i64)).rem_euclid(p as i64) == 0
            },
            crate::platform::Platform::Kick => {
                (hash.wrapping_add((now_ms / 1000) as i64)).rem_euclid(p as i64) == 1
            },
            crate::platform::Platform::YouTube => {
                (hash.wrapping_add((now_ms / 5000) as i64)).rem_euclid(p as i64) == 2
            },
        }
    }
}

/// 31-based rolling hash over the id's UTF-16 units, wrapping at 32 bits.
fn name_hash(id: &str) -> i64 {
    let mut h: i32 = 0;
    for unit in id.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    i64::from(h)
}
