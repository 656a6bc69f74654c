//! Relay jobs and their Discord embed payloads.

use {herald_common::markup::strip_tags, serde::Serialize};

const ANNOUNCEMENT_COLOR: u32 = 3_447_003;
const LIVE_COLOR: u32 = 16_711_680;
const ONLINE_COLOR: u32 = 65_280;
const OFFLINE_COLOR: u32 = 16_711_680;

/// One webhook delivery waiting in the relay queue.
#[derive(Debug, Clone)]
pub enum RelayJob {
    Announcement {
        url: String,
        message: String,
        channel: String,
    },
    StreamerLive {
        url: String,
        streamer: String,
        platform: String,
        stream_url: String,
    },
    ServerStatus {
        url: String,
        server: String,
        online: bool,
    },
}

impl RelayJob {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Announcement { url, .. }
            | Self::StreamerLive { url, .. }
            | Self::ServerStatus { url, .. } => url,
        }
    }

    /// Build the embed body. Markup tags are stripped from every user-facing
    /// string; JSON escaping happens at serialization.
    #[must_use]
    pub fn payload(&self) -> EmbedPayload {
        match self {
            Self::Announcement { message, .. } => {
                let clean = strip_tags(message);
                let (title, description) = match clean.split_once('\n') {
                    Some((first, rest)) => (first.trim().to_owned(), rest.trim().to_owned()),
                    None => (String::new(), clean.trim().to_owned()),
                };
                EmbedPayload::single(Embed {
                    title,
                    description,
                    url: None,
                    color: ANNOUNCEMENT_COLOR,
                    footer: Some(EmbedFooter {
                        text: "Powered by herald".to_owned(),
                    }),
                })
            },
            Self::StreamerLive {
                streamer,
                platform,
                stream_url,
                ..
            } => {
                let streamer = strip_tags(streamer);
                let platform = strip_tags(platform);
                EmbedPayload::single(Embed {
                    title: format!("\u{1f534} LIVE: {streamer}"),
                    description: format!("{streamer} is streaming on {platform}"),
                    url: Some(stream_url.clone()),
                    color: LIVE_COLOR,
                    footer: None,
                })
            },
            Self::ServerStatus { server, online, .. } => {
                let server = strip_tags(server);
                let (title, color) = if *online {
                    ("\u{2705} Server Online", ONLINE_COLOR)
                } else {
                    ("\u{26a0}\u{fe0f} Server Offline", OFFLINE_COLOR)
                };
                let state = if *online { "online" } else { "offline" };
                EmbedPayload::single(Embed {
                    title: title.to_owned(),
                    description: format!("The server {server} is currently {state}."),
                    url: None,
                    color,
                    footer: None,
                })
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedPayload {
    pub embeds: Vec<Embed>,
}

impl EmbedPayload {
    fn single(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}
