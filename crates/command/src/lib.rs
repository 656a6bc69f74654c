//! The `/herald` admin command: subcommand dispatch, permission gating,
//! tab completion, and per-actor rate limiting.

pub mod command;
pub mod rate_limit;
pub mod source;

pub use {
    command::{CommandHooks, HeraldCommand, RateLimitedCommand},
    rate_limit::CommandRateLimiter,
    source::CommandSource,
};
