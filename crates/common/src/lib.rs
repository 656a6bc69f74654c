//! Shared error definitions, time helpers, and markup utilities used across
//! all herald crates.

pub mod error;
pub mod markup;
pub mod time;

pub use error::{Error, FromMessage, HeraldError, Result};
