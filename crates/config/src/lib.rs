//! Configuration store for herald.
//!
//! The on-disk format is YAML: one main `config.yaml`, a `messages.yaml`
//! catalog of user-visible strings, a `streamers.yaml` roster, and one
//! announcements file per server and channel under `servers/<server>/`.
//! Everything is read through this crate; shape errors always degrade to
//! documented defaults instead of failing the caller.

pub mod error;
pub mod messages;
pub mod schema;
pub mod store;

pub use {
    error::{Error, Result},
    messages::Messages,
    schema::HeraldConfig,
    store::{AnnouncementsFile, ConfigStore, ServerConfigs},
};
