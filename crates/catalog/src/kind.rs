//! The five announcement channels.

use std::{fmt, str::FromStr};

/// Which presentation channel an announcement is delivered over. Every
/// server carries one config file per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    Chat,
    BossBar,
    Title,
    Subtitle,
    Advancement,
}

impl ChannelKind {
    pub const ALL: [Self; 5] = [
        Self::Chat,
        Self::BossBar,
        Self::Title,
        Self::Subtitle,
        Self::Advancement,
    ];

    /// Section key inside the loaded server configs.
    #[must_use]
    pub fn section_key(self) -> &'static str {
        match self {
            Self::Chat => "chat_announcements",
            Self::BossBar => "bossbar_announcements",
            Self::Title => "title_announcements",
            Self::Subtitle => "subtitle_announcements",
            Self::Advancement => "advancement_announcements",
        }
    }

    /// On-disk file name under `servers/<server>/`.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Chat => "chat-announcements.yaml",
            Self::BossBar => "bossbar-announcements.yaml",
            Self::Title => "title-announcements.yaml",
            Self::Subtitle => "subtitle-announcements.yaml",
            Self::Advancement => "advancement-announcements.yaml",
        }
    }

    /// Fragment used inside per-announcement permission nodes.
    #[must_use]
    pub fn permission_fragment(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::BossBar => "bossbar",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Advancement => "advancement",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.permission_fragment())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "bossbar" => Ok(Self::BossBar),
            "title" => Ok(Self::Title),
            "subtitle" => Ok(Self::Subtitle),
            "advancement" => Ok(Self::Advancement),
            other => Err(format!("unknown channel kind: {other}")),
        }
    }
}
