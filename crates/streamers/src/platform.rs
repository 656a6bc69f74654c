//! Supported streaming platforms.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Twitch,
    Kick,
    YouTube,
}

impl Platform {
    /// Lowercase id used in config files and placeholders. Unknown names
    /// fall back to Twitch.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "kick" => Self::Kick,
            "youtube" => Self::YouTube,
            _ => Self::Twitch,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Twitch => "twitch",
            Self::Kick => "kick",
            Self::YouTube => "youtube",
        }
    }

    /// Public channel URL for a streamer id on this platform.
    #[must_use]
    pub fn stream_url(self, streamer_id: &str) -> String {
        match self {
            Self::Twitch => format!("https://twitch.tv/{streamer_id}"),
            Self::Kick => format!("https://kick.com/{streamer_id}"),
            Self::YouTube => format!("https://youtube.com/channel/{streamer_id}"),
        }
    }
}
