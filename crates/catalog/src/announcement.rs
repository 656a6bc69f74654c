//! A single announcement: immutable config plus atomic runtime state.

use {
    crate::{
        kind::ChannelKind,
        props::{self, ChannelProps},
    },
    herald_proxy::SoundSpec,
    serde_yaml::Value,
    std::sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

#[derive(Debug)]
pub struct Announcement {
    pub server_id: String,
    pub kind: ChannelKind,
    pub id: String,

    pub message: String,
    pub description: Option<String>,
    pub sound: Option<SoundSpec>,
    pub permission: Option<String>,
    pub webhook_url: Option<String>,
    pub scheduled: bool,
    pub interval_secs: u64,
    pub cooldown_secs: u64,
    pub props: ChannelProps,

    enabled: AtomicBool,
    last_sent_ms: AtomicU64,
    in_flight: AtomicBool,
}

impl Announcement {
    /// Build from one raw YAML entry. Every key is optional; anything
    /// missing or mistyped gets its default.
    #[must_use]
    pub fn from_entry(server_id: &str, kind: ChannelKind, id: &str, entry: &Value) -> Self {
        let sound_key = props::get_string(entry, "sound", "");
        let sound = if sound_key.is_empty() {
            None
        } else {
            Some(SoundSpec {
                key: sound_key,
                volume: props::get_f32(entry, "volume", 1.0),
                pitch: props::get_f32(entry, "pitch", 1.0),
            })
        };
        let optional = |key: &str| {
            let value = props::get_string(entry, key, "");
            (!value.is_empty()).then_some(value)
        };

        Self {
            server_id: server_id.to_owned(),
            kind,
            id: id.to_owned(),
            message: props::get_string(entry, "message", ""),
            description: optional("description"),
            sound,
            permission: optional("permission"),
            webhook_url: optional("webhook-url"),
            scheduled: props::get_bool(entry, "scheduled", false),
            interval_secs: props::get_u64(entry, "interval", 300),
            cooldown_secs: props::get_u64(entry, "cooldown", 0),
            props: ChannelProps::from_entry(kind, entry),
            enabled: AtomicBool::new(props::get_bool(entry, "enabled", true)),
            last_sent_ms: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Milliseconds since epoch of the last send; 0 means never sent.
    #[must_use]
    pub fn last_sent_ms(&self) -> u64 {
        self.last_sent_ms.load(Ordering::Acquire)
    }

    pub fn mark_sent(&self, now_ms: u64) {
        self.last_sent_ms.store(now_ms, Ordering::Release);
    }

    /// Scheduled-send readiness. Never-sent announcements are due
    /// immediately.
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        if !self.enabled() || !self.scheduled {
            return false;
        }
        let last = self.last_sent_ms();
        last == 0 || now_ms.saturating_sub(last) >= self.interval_secs.saturating_mul(1000)
    }

    /// Cooldown only applies once the announcement has been sent at least
    /// once.
    #[must_use]
    pub fn is_on_cooldown(&self, now_ms: u64) -> bool {
        let last = self.last_sent_ms();
        self.cooldown_secs > 0
            && last != 0
            && now_ms.saturating_sub(last) < self.cooldown_secs.saturating_mul(1000)
    }

    #[must_use]
    pub fn should_send(&self, now_ms: u64) -> bool {
        self.enabled() && !self.is_on_cooldown(now_ms)
    }

    /// Claims the announcement for one dispatch. Returns `false` when a
    /// dispatch is already running, so concurrent ticks cannot double-send.
    #[must_use]
    pub fn begin_send(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn finish_send(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Round-trip back to the on-disk entry shape.
    #[must_use]
    pub fn to_yaml(&self) -> Value {
        let mut map = serde_yaml::Mapping::new();
        map.insert("enabled".into(), Value::from(self.enabled()));
        map.insert("message".into(), Value::from(self.message.clone()));
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::from(description.clone()));
        }
        if let Some(sound) = &self.sound {
            map.insert("sound".into(), Value::from(sound.key.clone()));
            map.insert("volume".into(), Value::from(sound.volume));
            map.insert("pitch".into(), Value::from(sound.pitch));
        }
        if let Some(permission) = &self.permission {
            map.insert("permission".into(), Value::from(permission.clone()));
        }
        if let Some(url) = &self.webhook_url {
            map.insert("webhook-url".into(), Value::from(url.clone()));
        }
        map.insert("scheduled".into(), Value::from(self.scheduled));
        map.insert("interval".into(), Value::from(self.interval_secs));
        map.insert("cooldown".into(), Value::from(self.cooldown_secs));
        self.props.write_into(&mut map);
        Value::Mapping(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn chat(yaml: &str) -> Announcement {
        let entry: Value = serde_yaml::from_str(yaml).unwrap();
        Announcement::from_entry("lobby", ChannelKind::Chat, "motd", &entry)
    }

    #[test]
    fn defaults_match_documented_shape() {
        let a = chat("{}");
        assert!(a.enabled());
        assert_eq!(a.message, "");
        assert!(a.sound.is_none());
        assert!(!a.scheduled);
        assert_eq!(a.interval_secs, 300);
        assert_eq!(a.cooldown_secs, 0);
        assert_eq!(a.last_sent_ms(), 0);
    }

    #[test]
    fn never_sent_is_due_immediately() {
        let a = chat("{scheduled: true, interval: 300}");
        assert!(a.is_due(1_000_000));
    }

    #[test]
    fn due_exactly_at_interval_boundary() {
        let a = chat("{scheduled: true, interval: 300}");
        let now = 10_000_000;
        a.mark_sent(now);
        assert!(!a.is_due(now + 299_999));
        assert!(a.is_due(now + 300_000));
    }

    #[test]
    fn unscheduled_is_never_due() {
        let a = chat("{interval: 1}");
        assert!(!a.is_due(u64::MAX));
    }

    #[test]
    fn cooldown_ignores_never_sent() {
        let a = chat("{cooldown: 60}");
        assert!(!a.is_on_cooldown(5_000));
        a.mark_sent(5_000);
        assert!(a.is_on_cooldown(5_000 + 59_999));
        assert!(!a.is_on_cooldown(5_000 + 60_000));
    }

    #[test]
    fn begin_send_claims_exclusively() {
        let a = chat("{}");
        assert!(a.begin_send());
        assert!(!a.begin_send());
        a.finish_send();
        assert!(a.begin_send());
    }

    #[test]
    fn yaml_round_trip_preserves_fields() {
        let a = chat("{message: '<red>hi</red>', scheduled: true, interval: 60, sound: 'minecraft:block.bell.use'}");
        let yaml = a.to_yaml();
        let b = Announcement::from_entry("lobby", ChannelKind::Chat, "motd", &yaml);
        assert_eq!(b.message, a.message);
        assert_eq!(b.scheduled, a.scheduled);
        assert_eq!(b.interval_secs, a.interval_secs);
        assert_eq!(b.sound, a.sound);
    }
}
