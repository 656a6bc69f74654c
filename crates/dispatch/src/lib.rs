//! Delivery of an announcement to its audience over one of the five
//! channels, plus the first-join welcome path.

pub mod audience;
pub mod dispatcher;
pub mod sanitize;
pub mod typing;
pub mod welcome;

pub use {
    audience::permission_node,
    dispatcher::Dispatcher,
    welcome::WelcomeTracker,
};
