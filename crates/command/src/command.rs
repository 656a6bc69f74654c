//! `/herald` subcommand dispatch and tab completion.

use std::sync::Arc;

use {
    async_trait::async_trait,
    herald_catalog::{Announcement, CatalogService, ChannelKind},
    herald_common::time::now_ms,
    herald_config::ConfigStore,
    herald_proxy::{PermissionOracle, ServerDirectory},
    tracing::info,
};

use crate::{rate_limit::CommandRateLimiter, source::CommandSource};

const RATE_LIMIT_RESPONSE: &str =
    "<red>Command rate limit exceeded. Please wait a moment before trying again.</red>";

/// Side effects a command can trigger but this crate doesn't own: a full
/// reload and an immediate out-of-schedule send.
#[async_trait]
pub trait CommandHooks: Send + Sync {
    async fn reload(&self);
    async fn send_now(&self, announcement: Arc<Announcement>);
}

pub struct HeraldCommand {
    catalog: Arc<CatalogService>,
    config: Arc<ConfigStore>,
    directory: Arc<dyn ServerDirectory>,
    permissions: Arc<dyn PermissionOracle>,
    hooks: Arc<dyn CommandHooks>,
}

impl HeraldCommand {
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>,
        config: Arc<ConfigStore>,
        directory: Arc<dyn ServerDirectory>,
        permissions: Arc<dyn PermissionOracle>,
        hooks: Arc<dyn CommandHooks>,
    ) -> Self {
        Self {
            catalog,
            config,
            directory,
            permissions,
            hooks,
        }
    }

    /// Run the command; returns response lines (markup) for the source.
    pub async fn execute(&self, source: &CommandSource, args: &[&str]) -> Vec<String> {
        let messages = self.config.messages();
        if !self.allowed(source, "admin") {
            return vec![messages.text("general.no-permission")];
        }

        match args.first().map(|a| a.to_ascii_lowercase()).as_deref() {
            None => self.help(source),
            Some("reload") => {
                if !self.allowed(source, "reload") {
                    return vec![messages.text("general.no-permission")];
                }
                self.hooks.reload().await;
                info!("configuration reloaded by command");
                vec![messages.text("general.plugin-reloaded")]
            },
            Some("announcement") => {
                if !self.allowed(source, "announcement") {
                    return vec![messages.text("general.no-permission")];
                }
                self.handle_toggle(args)
            },
            Some("test") => {
                if !self.allowed(source, "test") {
                    return vec![messages.text("general.no-permission")];
                }
                self.handle_test(args).await
            },
            Some(_) => self.help(source),
        }
    }

    /// `/herald announcement <kind> <server> <id> on|off`
    fn handle_toggle(&self, args: &[&str]) -> Vec<String> {
        let messages = self.config.messages();
        let [_, kind_arg, server_arg, id_arg, state_arg, ..] = args else {
            return vec![messages.text("general.invalid-command")];
        };

        let Some((kind, announcement)) = self.lookup(kind_arg, server_arg, id_arg) else {
            return self.lookup_failure(kind_arg, server_arg, id_arg);
        };

        let enable = state_arg.eq_ignore_ascii_case("on");
        if let Err(e) = self
            .catalog
            .set_enabled(server_arg, kind, &announcement.id, enable)
        {
            return vec![messages.text_with("general.error", &[("error", &e.to_string())])];
        }

        let path = if enable {
            "announcements.enabled"
        } else {
            "announcements.disabled"
        };
        vec![messages.text_with(path, &[("id", id_arg), ("server", server_arg)])]
    }

    /// `/herald test <kind> <server> <id>`
    async fn handle_test(&self, args: &[&str]) -> Vec<String> {
        let messages = self.config.messages();
        let [_, kind_arg, server_arg, id_arg, ..] = args else {
            return vec![messages.text("general.invalid-command")];
        };

        let Some((_, announcement)) = self.lookup(kind_arg, server_arg, id_arg) else {
            return self.lookup_failure(kind_arg, server_arg, id_arg);
        };

        self.hooks.send_now(announcement).await;
        vec![messages.text_with("announcements.test-sent", &[("id", id_arg), ("server", server_arg)])]
    }

    fn lookup(
        &self,
        kind_arg: &str,
        server_arg: &str,
        id_arg: &str,
    ) -> Option<(ChannelKind, Arc<Announcement>)> {
        if self.directory.server(server_arg).is_none() {
            return None;
        }
        let kind: ChannelKind = kind_arg.parse().ok()?;
        let announcement = self.catalog.get(server_arg, kind, id_arg)?;
        Some((kind, announcement))
    }

    /// Figure out which step of the lookup failed and phrase the response
    /// accordingly, in the same order the lookup runs.
    fn lookup_failure(&self, kind_arg: &str, server_arg: &str, id_arg: &str) -> Vec<String> {
        let messages = self.config.messages();
        if self.directory.server(server_arg).is_none() {
            return vec![messages.text_with("general.server-not-found", &[("server", server_arg)])];
        }
        if kind_arg.parse::<ChannelKind>().is_err() {
            return vec![messages.text_with("announcements.invalid-type", &[("type", kind_arg)])];
        }
        vec![messages.text_with(
            "announcements.not-found",
            &[("id", id_arg), ("server", server_arg)],
        )]
    }

    fn help(&self, source: &CommandSource) -> Vec<String> {
        let messages = self.config.messages();
        let mut lines = vec![format!("{}<yellow>herald commands:</yellow>", messages.prefix())];
        if self.allowed(source, "reload") {
            lines.push("<gray>/herald reload</gray> - <white>Reload the configuration</white>".into());
        }
        if self.allowed(source, "announcement") {
            lines.push(
                "<gray>/herald announcement <kind> <server> <id> on|off</gray> - <white>Toggle an announcement</white>".into(),
            );
        }
        if self.allowed(source, "test") {
            lines.push("<gray>/herald test <kind> <server> <id></gray> - <white>Send an announcement now</white>".into());
        }
        lines
    }

    fn allowed(&self, source: &CommandSource, key: &str) -> bool {
        match source {
            CommandSource::Console => true,
            CommandSource::Player(actor) => {
                let node = self.config.main().permissions.command_node(key);
                self.permissions.has_permission(actor, &node)
            },
        }
    }

    /// Tab completion mirroring the permission gating of `execute`.
    #[must_use]
    pub fn suggest(&self, source: &CommandSource, args: &[&str]) -> Vec<String> {
        if !self.allowed(source, "admin") {
            return Vec::new();
        }

        match args {
            [] | [_] => {
                let prefix = args.first().map_or("", |a| *a).to_ascii_lowercase();
                ["reload", "announcement", "test"]
                    .into_iter()
                    .filter(|sub| sub.starts_with(&prefix) && self.allowed(source, sub_key(sub)))
                    .map(str::to_owned)
                    .collect()
            },
            [sub, rest @ ..] if is_lookup_sub(sub) => {
                if !self.allowed(source, sub_key(sub)) {
                    return Vec::new();
                }
                self.suggest_lookup(sub, rest)
            },
            _ => Vec::new(),
        }
    }

    fn suggest_lookup(&self, sub: &str, rest: &[&str]) -> Vec<String> {
        match rest {
            [kind_prefix] => ChannelKind::ALL
                .into_iter()
                .map(|k| k.to_string())
                .filter(|k| k.starts_with(&kind_prefix.to_ascii_lowercase()))
                .collect(),
            [_, server_prefix] => {
                let prefix = server_prefix.to_ascii_lowercase();
                let mut servers: Vec<String> = self
                    .directory
                    .list_servers()
                    .into_iter()
                    .filter(|s| s.to_ascii_lowercase().starts_with(&prefix))
                    .collect();
                servers.sort();
                servers
            },
            [kind_arg, server_arg, id_prefix] => {
                let Ok(kind) = kind_arg.parse::<ChannelKind>() else {
                    return Vec::new();
                };
                let mut ids: Vec<String> = self
                    .catalog
                    .snapshot()
                    .ids(server_arg, kind)
                    .into_iter()
                    .filter(|id| id.starts_with(id_prefix))
                    .collect();
                ids.sort();
                ids
            },
            [_, _, _, state_prefix] if sub.eq_ignore_ascii_case("announcement") => ["on", "off"]
                .into_iter()
                .filter(|s| s.starts_with(&state_prefix.to_ascii_lowercase()))
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn is_lookup_sub(sub: &str) -> bool {
    sub.eq_ignore_ascii_case("announcement") || sub.eq_ignore_ascii_case("test")
}

fn sub_key(sub: &str) -> &'static str {
    if sub.eq_ignore_ascii_case("reload") {
        "reload"
    } else if sub.eq_ignore_ascii_case("test") {
        "test"
    } else {
        "announcement"
    }
}

/// Decorator applying [`CommandRateLimiter`] to a [`HeraldCommand`].
/// Console traffic and tab completion bypass the limiter.
pub struct RateLimitedCommand {
    inner: HeraldCommand,
    limiter: CommandRateLimiter,
}

impl RateLimitedCommand {
    #[must_use]
    pub fn new(inner: HeraldCommand, limiter: CommandRateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub async fn execute(&self, source: &CommandSource, args: &[&str]) -> Vec<String> {
        self.execute_at(source, args, now_ms()).await
    }

    pub async fn execute_at(
        &self,
        source: &CommandSource,
        args: &[&str],
        now_ms: u64,
    ) -> Vec<String> {
        if let CommandSource::Player(actor) = source {
            if !self.limiter.check_at(actor.id, now_ms) {
                return vec![RATE_LIMIT_RESPONSE.to_owned()];
            }
        }
        self.inner.execute(source, args).await
    }

    #[must_use]
    pub fn suggest(&self, source: &CommandSource, args: &[&str]) -> Vec<String> {
        self.inner.suggest(source, args)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        herald_catalog::{AnnouncementWriter, Catalog},
        herald_config::{AnnouncementsFile, ServerConfigs},
        herald_proxy::{Actor, InMemoryDirectory, StaticPermissions},
        std::{
            collections::HashMap,
            sync::atomic::{AtomicUsize, Ordering},
        },
    };

    struct NullWriter;

    impl AnnouncementWriter for NullWriter {
        fn write_announcement(
            &self,
            _server: &str,
            _kind: ChannelKind,
            _id: &str,
            _entry: serde_yaml::Value,
        ) -> herald_catalog::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        reloads: AtomicUsize,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl CommandHooks for RecordingHooks {
        async fn reload(&self) {
            self.reloads.fetch_add(1, Ordering::SeqCst);
        }

        async fn send_now(&self, _announcement: Arc<Announcement>) {
            self.sends.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        command: HeraldCommand,
        permissions: Arc<StaticPermissions>,
        hooks: Arc<RecordingHooks>,
        catalog: Arc<CatalogService>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ConfigStore::load(dir.path()).unwrap());
        let directory = Arc::new(InMemoryDirectory::new());
        directory.register("lobby");

        let mut file = AnnouncementsFile::default();
        file.announcements = serde_yaml::from_str("{motd: {message: hi}}").unwrap();
        let mut sections = HashMap::new();
        sections.insert("chat_announcements".to_owned(), file);
        let mut configs = ServerConfigs::new();
        configs.insert("lobby".to_owned(), sections);

        let catalog = Arc::new(CatalogService::new(
            Catalog::load(&configs),
            Arc::new(NullWriter),
        ));
        let permissions = Arc::new(StaticPermissions::new());
        let hooks = Arc::new(RecordingHooks::default());
        let command = HeraldCommand::new(
            catalog.clone(),
            config,
            directory,
            permissions.clone(),
            hooks.clone(),
        );
        Fixture {
            command,
            permissions,
            hooks,
            catalog,
            _dir: dir,
        }
    }

    fn admin(f: &Fixture) -> CommandSource {
        let actor = Actor::new("op");
        for key in ["admin", "reload", "test", "announcement"] {
            f.permissions.grant(actor.id, format!("herald.{key}"));
        }
        CommandSource::Player(actor)
    }

    #[tokio::test]
    async fn unprivileged_player_is_refused() {
        let f = fixture();
        let source = CommandSource::Player(Actor::new("pleb"));
        let out = f.command.execute(&source, &["reload"]).await;
        assert!(out[0].contains("Message not found") || out[0].contains("permission"));
        assert_eq!(f.hooks.reloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn console_bypasses_permissions() {
        let f = fixture();
        let out = f.command.execute(&CommandSource::Console, &["reload"]).await;
        assert_eq!(f.hooks.reloads.load(Ordering::SeqCst), 1);
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let f = fixture();
        let source = admin(&f);
        f.command
            .execute(&source, &["announcement", "chat", "lobby", "motd", "off"])
            .await;
        assert!(!f
            .catalog
            .get("lobby", ChannelKind::Chat, "motd")
            .unwrap()
            .enabled());

        f.command
            .execute(&source, &["announcement", "chat", "lobby", "motd", "on"])
            .await;
        assert!(f
            .catalog
            .get("lobby", ChannelKind::Chat, "motd")
            .unwrap()
            .enabled());
    }

    #[tokio::test]
    async fn test_subcommand_triggers_immediate_send() {
        let f = fixture();
        f.command
            .execute(&CommandSource::Console, &["test", "chat", "lobby", "motd"])
            .await;
        assert_eq!(f.hooks.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_server_and_kind_fail_in_order() {
        let f = fixture();
        let missing_server = f
            .command
            .execute(&CommandSource::Console, &["test", "chat", "nowhere", "motd"])
            .await;
        assert_eq!(f.hooks.sends.load(Ordering::SeqCst), 0);
        // Both failures surface as message-catalog lookups; the paths differ.
        let bad_kind = f
            .command
            .execute(&CommandSource::Console, &["test", "actionbar", "lobby", "motd"])
            .await;
        assert_ne!(missing_server, bad_kind);
    }

    #[tokio::test]
    async fn suggest_gates_per_subcommand() {
        let f = fixture();
        let actor = Actor::new("semi");
        f.permissions.grant(actor.id, "herald.admin");
        f.permissions.grant(actor.id, "herald.test");
        let source = CommandSource::Player(actor);

        assert_eq!(f.command.suggest(&source, &[]), vec!["test"]);
        assert!(f
            .command
            .suggest(&CommandSource::Player(Actor::new("pleb")), &[])
            .is_empty());
    }

    #[tokio::test]
    async fn suggest_walks_kinds_servers_ids_and_state() {
        let f = fixture();
        let source = CommandSource::Console;

        assert!(f
            .command
            .suggest(&source, &["announcement", "c"])
            .contains(&"chat".to_owned()));
        assert_eq!(
            f.command.suggest(&source, &["announcement", "chat", "lo"]),
            vec!["lobby"]
        );
        assert_eq!(
            f.command.suggest(&source, &["test", "chat", "lobby", "m"]),
            vec!["motd"]
        );
        assert_eq!(
            f.command
                .suggest(&source, &["announcement", "chat", "lobby", "motd", "o"]),
            vec!["on", "off"]
        );
        assert!(f
            .command
            .suggest(&source, &["test", "chat", "lobby", "motd", "x"])
            .is_empty());
    }

    #[tokio::test]
    async fn rate_limited_wrapper_rejects_the_sixth_call() {
        let f = fixture();
        let source = admin(&f);
        let limited = RateLimitedCommand::new(f.command, CommandRateLimiter::new(5));
        let now = 1_000_000;

        for _ in 0..5 {
            let out = limited.execute_at(&source, &["reload"], now).await;
            assert!(!out[0].contains("rate limit"));
        }
        let out = limited.execute_at(&source, &["reload"], now).await;
        assert!(out[0].contains("rate limit"));
        assert_eq!(f.hooks.reloads.load(Ordering::SeqCst), 5);

        // Console is never throttled.
        for _ in 0..10 {
            let out = limited.execute_at(&CommandSource::Console, &["reload"], now).await;
            assert!(!out[0].contains("rate limit"));
        }
    }
}
