//! Typed schema for the main `config.yaml`.
//!
//! Every field carries a default so a missing key or an entirely absent file
//! yields a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeraldConfig {
    pub announcements: AnnouncementsConfig,
    pub typing: TypingConfig,
    pub security: SecurityConfig,
    pub performance: PerformanceConfig,
    pub commands: CommandsConfig,
    pub servers: ServersConfig,
    pub streamers: StreamersConfig,
    pub webhooks: WebhooksConfig,
    pub permissions: PermissionsConfig,
}

/// Global announcement engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnnouncementsConfig {
    pub enabled: bool,
    /// Readiness-engine tick period in seconds.
    pub check_frequency: u64,
    pub welcome: WelcomeConfig,
}

impl Default for AnnouncementsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_frequency: 1,
            welcome: WelcomeConfig::default(),
        }
    }
}

/// First-join welcome message for a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WelcomeConfig {
    pub enabled: bool,
    pub message: String,
    pub sound: String,
    pub volume: f32,
    pub pitch: f32,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message: "<green>Welcome to the server!</green>".into(),
            sound: String::new(),
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

/// Chat typing-effect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TypingConfig {
    pub enabled: bool,
    pub delay_ms: u64,
    /// Messages longer than this are sent at once instead of typed.
    pub max_chars: usize,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 50,
            max_chars: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SecurityConfig {
    /// Strip `< > { } [ ] = ;` from placeholder values before substitution.
    pub sanitize_input: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sanitize_input: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PerformanceConfig {
    /// When set, dispatches run on spawned tasks instead of the tick loop.
    pub defer_sends: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommandsConfig {
    pub rate_limit: bool,
    pub max_per_minute: u32,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            rate_limit: true,
            max_per_minute: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServersConfig {
    /// Treat every registered server as reachable without pinging.
    pub assume_all_online: bool,
    /// Reachability probe period in seconds (ignored when assuming online).
    pub check_interval: u64,
}

impl Default for ServersConfig {
    fn default() -> Self {
        Self {
            assume_all_online: true,
            check_interval: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StreamersConfig {
    pub enabled: bool,
    pub check_interval: u64,
    /// Minimum seconds between two live announcements for the same streamer.
    pub cooldown: u64,
    pub default_webhook_url: String,
    pub simulation: SimulationConfig,
}

impl Default for StreamersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: 60,
            cooldown: 1800,
            default_webhook_url: String::new(),
            simulation: SimulationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SimulationConfig {
    pub enabled: bool,
    pub change_probability: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            change_probability: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WebhooksConfig {
    /// Mirror server reachability transitions to this URL when non-empty.
    pub server_status_url: String,
}

/// Permission node configuration for the command surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PermissionsConfig {
    pub base: String,
    pub commands: CommandNodes,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            base: "herald".into(),
            commands: CommandNodes::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommandNodes {
    pub admin: Option<String>,
    pub reload: Option<String>,
    pub test: Option<String>,
    pub announcement: Option<String>,
}

impl PermissionsConfig {
    /// Resolve a command permission key to its node, falling back to
    /// `<base>.<key>`.
    #[must_use]
    pub fn command_node(&self, key: &str) -> String {
        let configured = match key {
            "admin" => self.commands.admin.as_deref(),
            "reload" => self.commands.reload.as_deref(),
            "test" => self.commands.test.as_deref(),
            "announcement" => self.commands.announcement.as_deref(),
            _ => None,
        };
        configured
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{}.{key}", self.base))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let cfg: HeraldConfig = serde_yaml::from_str("{}").unwrap();
        assert!(cfg.announcements.enabled);
        assert_eq!(cfg.announcements.check_frequency, 1);
        assert!(cfg.security.sanitize_input);
        assert!(!cfg.performance.defer_sends);
        assert_eq!(cfg.commands.max_per_minute, 10);
        assert_eq!(cfg.typing.delay_ms, 50);
        assert_eq!(cfg.typing.max_chars, 100);
        assert_eq!(cfg.streamers.cooldown, 1800);
    }

    #[test]
    fn kebab_case_keys_parse() {
        let cfg: HeraldConfig = serde_yaml::from_str(
            r"
announcements:
  check-frequency: 5
typing:
  enabled: true
  delay-ms: 25
  max-chars: 40
security:
  sanitize-input: false
performance:
  defer-sends: true
",
        )
        .unwrap();
        assert_eq!(cfg.announcements.check_frequency, 5);
        assert!(cfg.typing.enabled);
        assert_eq!(cfg.typing.delay_ms, 25);
        assert_eq!(cfg.typing.max_chars, 40);
        assert!(!cfg.security.sanitize_input);
        assert!(cfg.performance.defer_sends);
    }

    #[test]
    fn command_node_falls_back_to_base() {
        let perms = PermissionsConfig::default();
        assert_eq!(perms.command_node("reload"), "herald.reload");

        let custom = PermissionsConfig {
            base: "net".into(),
            commands: CommandNodes {
                reload: Some("net.staff.reload".into()),
                ..CommandNodes::default()
            },
        };
        assert_eq!(custom.command_node("reload"), "net.staff.reload");
        assert_eq!(custom.command_node("test"), "net.test");
    }
}
