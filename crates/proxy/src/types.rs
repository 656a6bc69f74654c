//! Shared vocabulary between herald and the proxy's rendering layer.

use {
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

/// A connected user (or a command actor) as seen by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Point-in-time view of one backend server.
#[derive(Debug, Clone, Default)]
pub struct ServerSnapshot {
    pub reachable: bool,
    pub actors: Vec<Actor>,
}

/// A sound cue: namespaced key plus volume and pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SoundSpec {
    pub key: String,
    pub volume: f32,
    pub pitch: f32,
}

impl SoundSpec {
    /// Sound keys are `namespace:path` with a constrained charset; anything
    /// else is rejected before it reaches the renderer.
    #[must_use]
    pub fn key_is_valid(&self) -> bool {
        let (namespace, path) = match self.key.split_once(':') {
            Some(parts) => parts,
            None => ("", self.key.as_str()),
        };
        let ok = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/".contains(c))
        };
        (namespace.is_empty() || ok(namespace)) && ok(path)
    }
}

/// Boss-bar colors supported by the renderer. Unknown config strings fall
/// back to [`BarColor::Blue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BarColor {
    Pink,
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

impl BarColor {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PINK" => Self::Pink,
            "RED" => Self::Red,
            "GREEN" => Self::Green,
            "YELLOW" => Self::Yellow,
            "PURPLE" => Self::Purple,
            "WHITE" => Self::White,
            _ => Self::Blue,
        }
    }
}

/// Boss-bar overlay styles; unknown strings fall back to solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarStyle {
    #[default]
    Solid,
    Segmented6,
    Segmented10,
    Segmented12,
    Segmented20,
}

impl BarStyle {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "SEGMENTED_6" => Self::Segmented6,
            "SEGMENTED_10" => Self::Segmented10,
            "SEGMENTED_12" => Self::Segmented12,
            "SEGMENTED_20" => Self::Segmented20,
            _ => Self::Solid,
        }
    }
}

/// Title fade/stay timings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTimes {
    pub fade_in_ms: u64,
    pub stay_ms: u64,
    pub fade_out_ms: u64,
}
