use herald_common::FromMessage;

/// Crate-wide result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("unknown announcement {server}/{kind}/{id}")]
    UnknownAnnouncement {
        server: String,
        kind: String,
        id: String,
    },

    #[error(transparent)]
    Config(#[from] herald_config::Error),
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}
