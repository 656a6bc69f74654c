//! Polling service that announces go-live transitions.

use std::{sync::Arc, time::Duration};

use {
    herald_common::time::now_ms,
    herald_config::ConfigStore,
    herald_proxy::{BarColor, BarStyle, BossBarView, Presenter, ServerDirectory, TitleTimes, TitleView},
    herald_relay::{RelayHandle, RelayJob},
    serde_yaml::Value,
    tokio::{
        sync::{Mutex, Notify, RwLock},
        task::JoinHandle,
    },
    tracing::{debug, info},
    uuid::Uuid,
};

use crate::{probe::LiveProbe, streamer::Streamer};

const DEFAULT_LIVE_CHAT: &str =
    "<red>\u{1f534} LIVE</red> <white>\u{bb} {streamer} is now streaming on {platform}!</white>";
const DEFAULT_LIVE_TITLE: &str = "<red>\u{1f534} LIVE</red>";
const DEFAULT_LIVE_SUBTITLE: &str = "<white>{streamer} is now streaming!</white>";

const LIVE_TITLE_TIMES: TitleTimes = TitleTimes {
    fade_in_ms: 500,
    stay_ms: 3000,
    fade_out_ms: 500,
};
const LIVE_BAR_SECS: u64 = 15;

pub struct StreamerService {
    config: Arc<ConfigStore>,
    directory: Arc<dyn ServerDirectory>,
    presenter: Arc<dyn Presenter>,
    relay: Option<RelayHandle>,
    probe: Box<dyn LiveProbe>,
    streamers: RwLock<Vec<Arc<Streamer>>>,
    running: RwLock<bool>,
    shutdown: Notify,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StreamerService {
    #[must_use]
    pub fn new(
        config: Arc<ConfigStore>,
        directory: Arc<dyn ServerDirectory>,
        presenter: Arc<dyn Presenter>,
        relay: Option<RelayHandle>,
        probe: Box<dyn LiveProbe>,
    ) -> Arc<Self> {
        let streamers = load_streamers(&config.streamers_tree());
        info!(count = streamers.len(), "streamers loaded");
        Arc::new(Self {
            config,
            directory,
            presenter,
            relay,
            probe,
            streamers: RwLock::new(streamers),
            running: RwLock::new(false),
            shutdown: Notify::new(),
            poll_handle: Mutex::new(None),
        })
    }

    pub async fn streamer_count(&self) -> usize {
        self.streamers.read().await.len()
    }

    /// Re-read the roster from the config store. Live state starts over;
    /// a streamer currently live announces again on the next rising edge.
    pub async fn reload(&self) {
        let fresh = load_streamers(&self.config.streamers_tree());
        info!(count = fresh.len(), "streamer roster reloaded");
        *self.streamers.write().await = fresh;
    }

    pub async fn start(self: &Arc<Self>) {
        let settings = self.config.main().streamers;
        if !settings.enabled {
            debug!("streamer checks disabled by config");
            return;
        }
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        let service = Arc::clone(self);
        let handle = tokio::spawn(async move {
            service.poll_loop().await;
        });
        *self.poll_handle.lock().await = Some(handle);
        info!(interval = settings.check_interval, "streamer checks started");
    }

    pub async fn stop(&self) {
        {
            let mut running = self.running.write().await;
            if !*running {
                return;
            }
            *running = false;
        }
        self.shutdown.notify_one();
        if let Some(handle) = self.poll_handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("streamer checks stopped");
    }

    async fn poll_loop(self: Arc<Self>) {
        loop {
            let interval = self.config.main().streamers.check_interval.max(1);
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(interval)) => {}
                () = self.shutdown.notified() => break,
            }
            if !*self.running.read().await {
                break;
            }
            self.check_at(now_ms()).await;
        }
    }

    /// One probe pass. Announces every streamer whose status rose to live.
    pub async fn check_at(self: &Arc<Self>, now: u64) {
        let settings = self.config.main().streamers;
        if !settings.simulation.enabled {
            return;
        }
        let roster = self.streamers.read().await.clone();
        for streamer in &roster {
            let live = self.probe.is_live(streamer, now);
            if streamer.update_live(live) {
                self.announce(streamer, now).await;
            }
        }
    }

    async fn announce(self: &Arc<Self>, streamer: &Arc<Streamer>, now: u64) {
        let settings = self.config.main().streamers;
        let cooldown_ms = settings.cooldown.saturating_mul(1000);
        let last = streamer.last_announced_ms();
        if last != 0 && now.saturating_sub(last) < cooldown_ms {
            debug!(streamer = streamer.id, "go-live suppressed by announce cooldown");
            return;
        }
        streamer.mark_announced(now);
        info!(streamer = streamer.id, platform = streamer.platform.id(), "streamer went live");

        let stream_url = streamer.stream_url();
        let webhook = streamer
            .webhook_url
            .clone()
            .or_else(|| (!settings.default_webhook_url.is_empty()).then(|| settings.default_webhook_url.clone()));
        if let (Some(url), Some(relay)) = (webhook, &self.relay) {
            relay.enqueue(RelayJob::StreamerLive {
                url,
                streamer: streamer.id.clone(),
                platform: streamer.platform.id().to_owned(),
                stream_url: stream_url.clone(),
            });
        }

        let placeholders = [
            ("streamer", streamer.id.as_str()),
            ("platform", streamer.platform.id()),
            ("url", stream_url.as_str()),
        ];

        for server in self.target_servers(streamer) {
            self.announce_to_server(streamer, &server, &placeholders).await;
        }
    }

    fn target_servers(&self, streamer: &Streamer) -> Vec<String> {
        if streamer.servers.iter().any(|s| s == "all") {
            self.directory.list_servers()
        } else {
            streamer
                .servers
                .iter()
                .filter(|s| self.directory.server(s).is_some())
                .cloned()
                .collect()
        }
    }

    async fn announce_to_server(
        self: &Arc<Self>,
        streamer: &Streamer,
        server: &str,
        placeholders: &[(&str, &str)],
    ) {
        let Some(snapshot) = self.directory.server(server) else {
            return;
        };
        let audience = snapshot.actors;
        let messages = self.config.messages();
        let template = |channel: &str, path: &str, fallback: &str| -> String {
            let raw = streamer
                .custom_message(channel)
                .map(str::to_owned)
                .or_else(|| messages.get(path))
                .unwrap_or_else(|| fallback.to_owned());
            apply(&raw, placeholders)
        };

        for channel in &streamer.announcement_types {
            match channel.as_str() {
                "chat" => {
                    let message = template("chat", "streamers.live-chat", DEFAULT_LIVE_CHAT);
                    self.presenter.send_chat(server, &audience, &message).await;
                },
                "title" => {
                    let title = template("title", "streamers.live-title", DEFAULT_LIVE_TITLE);
                    let subtitle =
                        template("subtitle", "streamers.live-subtitle", DEFAULT_LIVE_SUBTITLE);
                    self.presenter
                        .show_title(
                            server,
                            &audience,
                            TitleView {
                                title,
                                subtitle,
                                times: LIVE_TITLE_TIMES,
                            },
                        )
                        .await;
                },
                "bossbar" => {
                    let message = template("bossbar", "streamers.live-chat", DEFAULT_LIVE_CHAT);
                    let bar_id = Uuid::new_v4();
                    self.presenter
                        .show_boss_bar(
                            server,
                            &audience,
                            BossBarView {
                                id: bar_id,
                                markup: message,
                                color: BarColor::Red,
                                style: BarStyle::Solid,
                                progress: 1.0,
                            },
                        )
                        .await;
                    let service = Arc::clone(self);
                    let server = server.to_owned();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(LIVE_BAR_SECS)).await;
                        service.presenter.hide_boss_bar(&server, bar_id).await;
                    });
                },
                other => debug!(channel = other, "unknown streamer announcement type"),
            }
        }
    }
}

fn load_streamers(tree: &Value) -> Vec<Arc<Streamer>> {
    tree.get("streamers")
        .and_then(Value::as_mapping)
        .map(|map| {
            map.iter()
                .filter_map(|(id, entry)| {
                    Some(Arc::new(Streamer::from_entry(id.as_str()?, entry)))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `{key}` substitution for message templates.
fn apply(template: &str, placeholders: &[(&str, &str)]) -> String {
    let mut out = template.to_owned();
    for (key, value) in placeholders {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
