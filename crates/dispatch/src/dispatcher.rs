//! The multi-channel dispatcher.

use std::{sync::Arc, time::Duration};

use {
    dashmap::DashMap,
    herald_catalog::{Announcement, ChannelProps},
    herald_common::time::{now_ms, ticks_to_ms},
    herald_config::ConfigStore,
    herald_proxy::{
        BossBarView, PermissionOracle, Presenter, ServerDirectory, TitleTimes, TitleView,
    },
    herald_relay::{RelayHandle, RelayJob},
    tracing::{debug, warn},
    uuid::Uuid,
};

use crate::{audience, sanitize::apply_placeholders, typing};

/// Fallback timing used when an advancement toast degrades to a title.
const ADVANCEMENT_TIMES: TitleTimes = TitleTimes {
    fade_in_ms: ticks_to_ms(10),
    stay_ms: ticks_to_ms(40),
    fade_out_ms: ticks_to_ms(10),
};

pub struct Dispatcher {
    directory: Arc<dyn ServerDirectory>,
    permissions: Arc<dyn PermissionOracle>,
    presenter: Arc<dyn Presenter>,
    relay: Option<RelayHandle>,
    config: Arc<ConfigStore>,
    // (server, announcement id) -> live bar handle
    active_bars: DashMap<(String, String), Uuid>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        directory: Arc<dyn ServerDirectory>,
        permissions: Arc<dyn PermissionOracle>,
        presenter: Arc<dyn Presenter>,
        relay: Option<RelayHandle>,
        config: Arc<ConfigStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            directory,
            permissions,
            presenter,
            relay,
            config,
            active_bars: DashMap::new(),
        })
    }

    /// Deliver one announcement to its server. Empty or missing servers are
    /// a silent no-op; once delivery is attempted `last_sent` is stamped.
    pub async fn send(self: &Arc<Self>, announcement: &Arc<Announcement>, placeholders: &[(&str, &str)]) {
        self.send_at(announcement, placeholders, now_ms()).await;
    }

    pub async fn send_at(
        self: &Arc<Self>,
        announcement: &Arc<Announcement>,
        placeholders: &[(&str, &str)],
        now: u64,
    ) {
        let Some(server) = self.directory.server(&announcement.server_id) else {
            return;
        };
        if server.actors.is_empty() {
            return;
        }

        let main = self.config.main();
        let audience = audience::select(
            &server.actors,
            announcement,
            self.permissions.as_ref(),
            &main.permissions.base,
        );
        let message = apply_placeholders(
            &announcement.message,
            placeholders,
            main.security.sanitize_input,
        );

        match &announcement.props {
            ChannelProps::Chat { typing_effect } => {
                if *typing_effect && main.typing.enabled {
                    for actor in &audience {
                        typing::spawn_reveal(
                            Arc::clone(&self.presenter),
                            actor.clone(),
                            &message,
                            main.typing.delay_ms,
                            main.typing.max_chars,
                        );
                    }
                } else {
                    self.presenter
                        .send_chat(&announcement.server_id, &audience, &message)
                        .await;
                }
            },
            ChannelProps::BossBar {
                color,
                style,
                duration_secs,
            } => {
                self.show_boss_bar(announcement, &audience, message.clone(), *color, *style, *duration_secs)
                    .await;
            },
            ChannelProps::Title {
                fade_in,
                stay,
                fade_out,
            } => {
                self.presenter
                    .show_title(
                        &announcement.server_id,
                        &audience,
                        TitleView {
                            title: message.clone(),
                            subtitle: String::new(),
                            times: tick_times(*fade_in, *stay, *fade_out),
                        },
                    )
                    .await;
            },
            ChannelProps::Subtitle {
                fade_in,
                stay,
                fade_out,
            } => {
                self.presenter
                    .show_title(
                        &announcement.server_id,
                        &audience,
                        TitleView {
                            title: String::new(),
                            subtitle: message.clone(),
                            times: tick_times(*fade_in, *stay, *fade_out),
                        },
                    )
                    .await;
            },
            ChannelProps::Advancement { frame } => {
                // The proxy has no toast packet; degrade to a title pair.
                debug!(frame = frame.as_str(), "advancement rendered as title");
                let subtitle = announcement
                    .description
                    .as_deref()
                    .map(|d| {
                        apply_placeholders(d, placeholders, main.security.sanitize_input)
                    })
                    .unwrap_or_default();
                self.presenter
                    .show_title(
                        &announcement.server_id,
                        &audience,
                        TitleView {
                            title: message.clone(),
                            subtitle,
                            times: ADVANCEMENT_TIMES,
                        },
                    )
                    .await;
            },
        }

        if let Some(sound) = &announcement.sound {
            if sound.key_is_valid() {
                self.presenter
                    .play_sound(&announcement.server_id, &audience, sound)
                    .await;
            } else {
                warn!(key = sound.key, id = announcement.id, "invalid sound key, skipping");
            }
        }

        if let (Some(url), Some(relay)) = (&announcement.webhook_url, &self.relay) {
            relay.enqueue(RelayJob::Announcement {
                url: url.clone(),
                message: message.clone(),
                channel: announcement.kind.to_string(),
            });
        }

        announcement.mark_sent(now);
    }

    async fn show_boss_bar(
        self: &Arc<Self>,
        announcement: &Arc<Announcement>,
        audience: &[herald_proxy::Actor],
        markup: String,
        color: herald_proxy::BarColor,
        style: herald_proxy::BarStyle,
        duration_secs: u64,
    ) {
        let bar_id = Uuid::new_v4();
        let key = (announcement.server_id.clone(), announcement.id.clone());
        self.active_bars.insert(key.clone(), bar_id);

        self.presenter
            .show_boss_bar(
                &announcement.server_id,
                audience,
                BossBarView {
                    id: bar_id,
                    markup,
                    color,
                    style,
                    progress: 1.0,
                },
            )
            .await;

        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(duration_secs)).await;
            // A newer bar under the same key keeps its own entry.
            dispatcher
                .active_bars
                .remove_if(&key, |_, current| *current == bar_id);
            dispatcher.presenter.hide_boss_bar(&key.0, bar_id).await;
        });
    }

    /// Force-hide every registered boss bar. Run on reload and shutdown so
    /// bars don't outlive the announcements that created them.
    pub async fn clear_active_bars(&self) {
        let entries: Vec<((String, String), Uuid)> = self
            .active_bars
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        self.active_bars.clear();
        for ((server, _id), bar_id) in entries {
            self.presenter.hide_boss_bar(&server, bar_id).await;
        }
    }

    #[must_use]
    pub fn active_bar_count(&self) -> usize {
        self.active_bars.len()
    }
}

fn tick_times(fade_in: u32, stay: u32, fade_out: u32) -> TitleTimes {
    TitleTimes {
        fade_in_ms: ticks_to_ms(fade_in),
        stay_ms: ticks_to_ms(stay),
        fade_out_ms: ticks_to_ms(fade_out),
    }
}
