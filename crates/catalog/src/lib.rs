//! The announcement catalog: parsed, indexed announcements per server and
//! channel, with atomic runtime state layered on top of the on-disk config.

pub mod announcement;
pub mod error;
pub mod kind;
pub mod props;
pub mod service;

pub use {
    announcement::Announcement,
    error::{Error, Result},
    kind::ChannelKind,
    props::{ChannelProps, FrameKind},
    service::{AnnouncementWriter, Catalog, CatalogService},
};
