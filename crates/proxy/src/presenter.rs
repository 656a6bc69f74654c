//! Rendering seam: everything herald shows to players goes through here.

use {
    crate::types::{Actor, BarColor, BarStyle, SoundSpec, TitleTimes},
    async_trait::async_trait,
    tracing::info,
    uuid::Uuid,
};

/// A boss bar as handed to the renderer.
#[derive(Debug, Clone)]
pub struct BossBarView {
    pub id: Uuid,
    pub markup: String,
    pub color: BarColor,
    pub style: BarStyle,
    pub progress: f32,
}

/// A title/subtitle pair with fade timings.
#[derive(Debug, Clone)]
pub struct TitleView {
    pub title: String,
    pub subtitle: String,
    pub times: TitleTimes,
}

/// Output adapter toward the proxy. Implementations must tolerate being
/// called for servers or actors that vanished between snapshot and send.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn send_chat(&self, server: &str, audience: &[Actor], markup: &str);

    async fn send_chat_to(&self, actor: &Actor, markup: &str);

    async fn show_boss_bar(&self, server: &str, audience: &[Actor], bar: BossBarView);

    async fn hide_boss_bar(&self, server: &str, bar_id: Uuid);

    async fn show_title(&self, server: &str, audience: &[Actor], title: TitleView);

    async fn play_sound(&self, server: &str, audience: &[Actor], sound: &SoundSpec);
}

/// Presenter that writes structured log lines instead of packets. This is
/// what the standalone binary runs with.
#[derive(Default)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn send_chat(&self, server: &str, audience: &[Actor], markup: &str) {
        info!(server, recipients = audience.len(), message = markup, "chat");
    }

    async fn send_chat_to(&self, actor: &Actor, markup: &str) {
        info!(actor = %actor.name, message = markup, "chat.direct");
    }

    async fn show_boss_bar(&self, server: &str, audience: &[Actor], bar: BossBarView) {
        info!(
            server,
            recipients = audience.len(),
            bar_id = %bar.id,
            color = ?bar.color,
            style = ?bar.style,
            message = bar.markup,
            "bossbar.show"
        );
    }

    async fn hide_boss_bar(&self, server: &str, bar_id: Uuid) {
        info!(server, bar_id = %bar_id, "bossbar.hide");
    }

    async fn show_title(&self, server: &str, audience: &[Actor], title: TitleView) {
        info!(
            server,
            recipients = audience.len(),
            title = title.title,
            subtitle = title.subtitle,
            "title.show"
        );
    }

    async fn play_sound(&self, server: &str, audience: &[Actor], sound: &SoundSpec) {
        info!(
            server,
            recipients = audience.len(),
            key = sound.key,
            volume = sound.volume,
            pitch = sound.pitch,
            "sound.play"
        );
    }
}
