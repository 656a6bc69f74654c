//! Discord webhook relay: a bounded queue feeding one background worker.
//!
//! Senders never block and never learn about delivery failures; webhook
//! traffic is strictly best-effort and must not stall announcement sends.

pub mod job;
pub mod worker;

pub use {
    job::{EmbedPayload, RelayJob},
    worker::{RelayHandle, RelayWorker},
};
