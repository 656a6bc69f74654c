//! One tracked streamer: config plus live-status state.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use {crate::platform::Platform, serde_yaml::Value};

#[derive(Debug)]
pub struct Streamer {
    pub id: String,
    pub platform: Platform,
    /// Target servers; the literal `"all"` fans out to every known server.
    pub servers: Vec<String>,
    /// Which channels to announce on: any of `chat`, `title`, `bossbar`.
    pub announcement_types: Vec<String>,
    pub webhook_url: Option<String>,
    /// Per-channel overrides for the `messages.yaml` templates.
    pub custom_messages: HashMap<String, String>,

    live: AtomicBool,
    last_announced_ms: AtomicU64,
}

impl Streamer {
    /// Parse one entry from the `streamers:` tree, tolerating missing keys.
    #[must_use]
    pub fn from_entry(id: &str, entry: &Value) -> Self {
        let string_list = |key: &str, fallback: &str| -> Vec<String> {
            entry
                .get(key)
                .and_then(Value::as_sequence)
                .map(|seq| {
                    seq.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .filter(|v: &Vec<String>| !v.is_empty())
                .unwrap_or_else(|| vec![fallback.to_owned()])
        };

        let custom_messages = entry
            .get("messages")
            .and_then(Value::as_mapping)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_owned(), v.as_str()?.to_owned())))
                    .collect()
            })
            .unwrap_or_default();

        let webhook_url = entry
            .get("webhook-url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Self {
            id: id.to_owned(),
            platform: Platform::parse(entry.get("platform").and_then(Value::as_str).unwrap_or("twitch")),
            servers: string_list("servers", "all"),
            announcement_types: string_list("announcement-types", "chat"),
            webhook_url,
            custom_messages,
            live: AtomicBool::new(false),
            last_announced_ms: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Record the probed status; returns `true` on an offline→live edge.
    pub fn update_live(&self, live: bool) -> bool {
        let was = self.live.swap(live, Ordering::AcqRel);
        live && !was
    }

    #[must_use]
    pub fn last_announced_ms(&self) -> u64 {
        self.last_announced_ms.load(Ordering::Acquire)
    }

    pub fn mark_announced(&self, now_ms: u64) {
        self.last_announced_ms.store(now_ms, Ordering::Release);
    }

    #[must_use]
    pub fn stream_url(&self) -> String {
        self.platform.stream_url(&self.id)
    }

    #[must_use]
    pub fn custom_message(&self, channel: &str) -> Option<&str> {
        self.custom_messages.get(channel).map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_empty_entry() {
        let s = Streamer::from_entry("ninja", &serde_yaml::from_str("{}").unwrap());
        assert_eq!(s.platform, Platform::Twitch);
        assert_eq!(s.servers, vec!["all"]);
        assert_eq!(s.announcement_types, vec!["chat"]);
        assert!(s.webhook_url.is_none());
        assert!(!s.is_live());
    }

    #[test]
    fn full_entry_parses() {
        let s = Streamer::from_entry(
            "xqc",
            &serde_yaml::from_str(
                "{platform: kick, servers: [lobby], announcement-types: [chat, title], webhook-url: 'http://h', messages: {chat: 'custom {streamer}'}}",
            )
            .unwrap(),
        );
        assert_eq!(s.platform, Platform::Kick);
        assert_eq!(s.servers, vec!["lobby"]);
        assert_eq!(s.announcement_types, vec!["chat", "title"]);
        assert_eq!(s.webhook_url.as_deref(), Some("http://h"));
        assert_eq!(s.custom_message("chat"), Some("custom {streamer}"));
    }

    #[test]
    fn update_live_reports_rising_edge_only() {
        let s = Streamer::from_entry("ninja", &serde_yaml::from_str("{}").unwrap());
        assert!(s.update_live(true));
        assert!(!s.update_live(true));
        assert!(!s.update_live(false));
        assert!(s.update_live(true));
    }
}
