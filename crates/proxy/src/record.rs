//! Recording presenter used by tests across the workspace.

use {
    crate::{
        presenter::{BossBarView, Presenter, TitleView},
        types::{Actor, SoundSpec},
    },
    async_trait::async_trait,
    std::sync::Mutex,
    uuid::Uuid,
};

/// What a [`RecordingPresenter`] saw, in call order.
#[derive(Debug, Clone)]
pub enum PresentedEvent {
    Chat {
        server: String,
        recipients: usize,
        markup: String,
    },
    DirectChat {
        actor: String,
        markup: String,
    },
    BossBarShown {
        server: String,
        bar_id: Uuid,
        markup: String,
    },
    BossBarHidden {
        server: String,
        bar_id: Uuid,
    },
    Title {
        server: String,
        title: String,
        subtitle: String,
    },
    Sound {
        server: String,
        key: String,
    },
}

/// Presenter that appends every call to an internal log. Poisoned-lock
/// panics are acceptable here: this type is only used from tests.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresentedEvent>>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<PresentedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: PresentedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn send_chat(&self, server: &str, audience: &[Actor], markup: &str) {
        self.push(PresentedEvent::Chat {
            server: server.to_owned(),
            recipients: audience.len(),
            markup: markup.to_owned(),
        });
    }

    async fn send_chat_to(&self, actor: &Actor, markup: &str) {
        self.push(PresentedEvent::DirectChat {
            actor: actor.name.clone(),
            markup: markup.to_owned(),
        });
    }

    async fn show_boss_bar(&self, server: &str, _audience: &[Actor], bar: BossBarView) {
        self.push(PresentedEvent::BossBarShown {
            server: server.to_owned(),
            bar_id: bar.id,
            markup: bar.markup,
        });
    }

    async fn hide_boss_bar(&self, server: &str, bar_id: Uuid) {
        self.push(PresentedEvent::BossBarHidden {
            server: server.to_owned(),
            bar_id,
        });
    }

    async fn show_title(&self, server: &str, _audience: &[Actor], title: TitleView) {
        self.push(PresentedEvent::Title {
            server: server.to_owned(),
            title: title.title,
            subtitle: title.subtitle,
        });
    }

    async fn play_sound(&self, server: &str, _audience: &[Actor], sound: &SoundSpec) {
        self.push(PresentedEvent::Sound {
            server: server.to_owned(),
            key: sound.key.clone(),
        });
    }
}
