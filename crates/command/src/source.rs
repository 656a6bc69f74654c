//! Who is invoking a command.

use herald_proxy::Actor;

#[derive(Debug, Clone)]
pub enum CommandSource {
    /// The proxy console. Bypasses permission checks and rate limiting.
    Console,
    Player(Actor),
}

impl CommandSource {
    #[must_use]
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Console => None,
            Self::Player(actor) => Some(actor),
        }
    }
}
