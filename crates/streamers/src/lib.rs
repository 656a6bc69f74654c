//! Streamer live-status tracking and go-live announcements.
//!
//! Real platform APIs are out of scope; liveness comes from a pluggable
//! [`LiveProbe`], shipped with a deterministic simulator.

pub mod platform;
pub mod probe;
pub mod service;
pub mod streamer;

pub use {
    platform::Platform,
    probe::{LiveProbe, SimulatedProbe},
    service::StreamerService,
    streamer::Streamer,
};
