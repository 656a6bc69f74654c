//! Trait boundary between herald and the hosting proxy.
//!
//! The proxy owns the server topology, the permission system, and the actual
//! rendering of rich text to connected actors. Herald only talks to these
//! three seams; each has a standalone implementation here so the engine can
//! run (and be tested) without a real proxy behind it.

pub mod directory;
pub mod permissions;
pub mod presenter;
pub mod record;
pub mod status;
pub mod types;

pub use {
    directory::{ConnectFn, DisconnectFn, InMemoryDirectory, ServerDirectory},
    permissions::{AllowAllPermissions, PermissionOracle, StaticPermissions},
    presenter::{BossBarView, LogPresenter, Presenter, TitleView},
    record::{PresentedEvent, RecordingPresenter},
    status::{StatusChangeFn, StatusMonitor},
    types::{Actor, BarColor, BarStyle, ServerSnapshot, SoundSpec, TitleTimes},
};
