//! Per-channel presentation properties.

use {
    crate::kind::ChannelKind,
    herald_proxy::{BarColor, BarStyle},
    serde_yaml::Value,
};

/// Advancement toast frame shapes. Unknown strings fall back to challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameKind {
    Task,
    Goal,
    #[default]
    Challenge,
}

impl FrameKind {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "TASK" => Self::Task,
            "GOAL" => Self::Goal,
            _ => Self::Challenge,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::Goal => "GOAL",
            Self::Challenge => "CHALLENGE",
        }
    }
}

/// Channel-specific settings. Exactly one variant per [`ChannelKind`], so an
/// announcement can never carry properties from the wrong channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelProps {
    Chat {
        typing_effect: bool,
    },
    BossBar {
        color: BarColor,
        style: BarStyle,
        duration_secs: u64,
    },
    Title {
        fade_in: u32,
        stay: u32,
        fade_out: u32,
    },
    Subtitle {
        fade_in: u32,
        stay: u32,
        fade_out: u32,
    },
    Advancement {
        frame: FrameKind,
    },
}

impl ChannelProps {
    /// Parse the kind-specific keys out of a raw announcement entry. Missing
    /// or mistyped keys resolve to their defaults.
    #[must_use]
    pub fn from_entry(kind: ChannelKind, entry: &Value) -> Self {
        match kind {
            ChannelKind::Chat => Self::Chat {
                typing_effect: get_bool(entry, "typing-effect", false),
            },
            ChannelKind::BossBar => Self::BossBar {
                color: BarColor::parse(&get_string(entry, "color", "BLUE")),
                style: BarStyle::parse(&get_string(entry, "style", "SOLID")),
                duration_secs: get_u64(entry, "duration", 10),
            },
            ChannelKind::Title => Self::Title {
                fade_in: get_u32(entry, "fade-in", 10),
                stay: get_u32(entry, "stay", 40),
                fade_out: get_u32(entry, "fade-out", 10),
            },
            ChannelKind::Subtitle => Self::Subtitle {
                fade_in: get_u32(entry, "fade-in", 10),
                stay: get_u32(entry, "stay", 40),
                fade_out: get_u32(entry, "fade-out", 10),
            },
            ChannelKind::Advancement => Self::Advancement {
                frame: FrameKind::parse(&get_string(entry, "frame", "CHALLENGE")),
            },
        }
    }

    /// Serialize the kind-specific keys back into a YAML mapping.
    pub fn write_into(&self, map: &mut serde_yaml::Mapping) {
        match self {
            Self::Chat { typing_effect } => {
                map.insert("typing-effect".into(), Value::from(*typing_effect));
            },
            Self::BossBar {
                color,
                style,
                duration_secs,
            } => {
                map.insert("color".into(), Value::from(format!("{color:?}").to_uppercase()));
                map.insert("style".into(), Value::from(style_name(*style)));
                map.insert("duration".into(), Value::from(*duration_secs));
            },
            Self::Title {
                fade_in,
                stay,
                fade_out,
            }
            | Self::Subtitle {
                fade_in,
                stay,
                fade_out,
            } => {
                map.insert("fade-in".into(), Value::from(*fade_in));
                map.insert("stay".into(), Value::from(*stay));
                map.insert("fade-out".into(), Value::from(*fade_out));
            },
            Self::Advancement { frame } => {
                map.insert("frame".into(), Value::from(frame.as_str()));
            },
        }
    }
}

fn style_name(style: BarStyle) -> &'static str {
    match style {
        BarStyle::Solid => "SOLID",
        BarStyle::Segmented6 => "SEGMENTED_6",
        BarStyle::Segmented10 => "SEGMENTED_10",
        BarStyle::Segmented12 => "SEGMENTED_12",
        BarStyle::Segmented20 => "SEGMENTED_20",
    }
}

pub(crate) fn get_string(entry: &Value, key: &str, default: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map_or_else(|| default.to_owned(), str::to_owned)
}

pub(crate) fn get_bool(entry: &Value, key: &str, default: bool) -> bool {
    entry.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn get_u64(entry: &Value, key: &str, default: u64) -> u64 {
    entry.get(key).and_then(Value::as_u64).unwrap_or(default)
}

pub(crate) fn get_u32(entry: &Value, key: &str, default: u32) -> u32 {
    entry
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

pub(crate) fn get_f32(entry: &Value, key: &str, default: f32) -> f32 {
    entry
        .get(key)
        .and_then(Value::as_f64)
        .map_or(default, |v| v as f32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn bossbar_defaults_apply() {
        let props = ChannelProps::from_entry(ChannelKind::BossBar, &entry("{}"));
        assert_eq!(
            props,
            ChannelProps::BossBar {
                color: BarColor::Blue,
                style: BarStyle::Solid,
                duration_secs: 10,
            }
        );
    }

    #[test]
    fn bossbar_unknown_color_falls_back() {
        let props = ChannelProps::from_entry(
            ChannelKind::BossBar,
            &entry("{color: MAUVE, style: SEGMENTED_10, duration: 30}"),
        );
        assert_eq!(
            props,
            ChannelProps::BossBar {
                color: BarColor::Blue,
                style: BarStyle::Segmented10,
                duration_secs: 30,
            }
        );
    }

    #[test]
    fn title_timing_keys_are_kebab_case() {
        let props = ChannelProps::from_entry(
            ChannelKind::Title,
            &entry("{fade-in: 5, stay: 100, fade-out: 5}"),
        );
        assert_eq!(
            props,
            ChannelProps::Title {
                fade_in: 5,
                stay: 100,
                fade_out: 5,
            }
        );
    }

    #[test]
    fn advancement_frame_defaults_to_challenge() {
        let props = ChannelProps::from_entry(ChannelKind::Advancement, &entry("{frame: sideways}"));
        assert_eq!(
            props,
            ChannelProps::Advancement {
                frame: FrameKind::Challenge
            }
        );
    }

    #[test]
    fn mistyped_value_resolves_to_default() {
        let props = ChannelProps::from_entry(ChannelKind::Chat, &entry("{typing-effect: 'yes'}"));
        assert_eq!(
            props,
            ChannelProps::Chat {
                typing_effect: false
            }
        );
    }
}
