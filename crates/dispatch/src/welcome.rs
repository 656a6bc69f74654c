//! First-join welcome messages.

use std::{collections::HashSet, sync::Arc};

use {
    dashmap::DashMap,
    herald_config::ConfigStore,
    herald_proxy::{Actor, Presenter, SoundSpec},
    tracing::warn,
    uuid::Uuid,
};

/// Greets actors the first time they reach each server in a session. The
/// visited set is per-connection; disconnecting resets it.
pub struct WelcomeTracker {
    config: Arc<ConfigStore>,
    presenter: Arc<dyn Presenter>,
    visited: DashMap<Uuid, HashSet<String>>,
}

impl WelcomeTracker {
    #[must_use]
    pub fn new(config: Arc<ConfigStore>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            config,
            presenter,
            visited: DashMap::new(),
        }
    }

    pub async fn on_server_connected(&self, server: &str, actor: &Actor) {
        let welcome = self.config.main().announcements.welcome;
        if !welcome.enabled {
            return;
        }
        let first_visit = self
            .visited
            .entry(actor.id)
            .or_default()
            .insert(server.to_owned());
        if !first_visit {
            return;
        }

        self.presenter.send_chat_to(actor, &welcome.message).await;

        if !welcome.sound.is_empty() {
            let sound = SoundSpec {
                key: welcome.sound,
                volume: welcome.volume,
                pitch: welcome.pitch,
            };
            if sound.key_is_valid() {
                self.presenter
                    .play_sound(server, std::slice::from_ref(actor), &sound)
                    .await;
            } else {
                warn!(key = sound.key, "invalid welcome sound key, skipping");
            }
        }
    }

    pub fn on_disconnect(&self, actor_id: Uuid) {
        self.visited.remove(&actor_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        herald_proxy::{PresentedEvent, RecordingPresenter},
    };

    fn tracker() -> (tempfile::TempDir, Arc<RecordingPresenter>, WelcomeTracker) {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ConfigStore::load(dir.path()).unwrap());
        let presenter = Arc::new(RecordingPresenter::new());
        let tracker = WelcomeTracker::new(config, presenter.clone());
        (dir, presenter, tracker)
    }

    #[tokio::test]
    async fn greets_only_on_first_visit_per_server() {
        let (_dir, presenter, tracker) = tracker();
        let actor = Actor::new("steve");

        tracker.on_server_connected("lobby", &actor).await;
        tracker.on_server_connected("lobby", &actor).await;
        tracker.on_server_connected("survival", &actor).await;

        let greetings = presenter
            .events()
            .iter()
            .filter(|e| matches!(e, PresentedEvent::DirectChat { .. }))
            .count();
        assert_eq!(greetings, 2);
    }

    #[tokio::test]
    async fn greets_through_directory_connection_hooks() {
        use herald_proxy::InMemoryDirectory;

        let (_dir, presenter, tracker) = tracker();
        let tracker = Arc::new(tracker);
        let directory = Arc::new(InMemoryDirectory::new());

        let on_join = Arc::clone(&tracker);
        let on_leave = Arc::clone(&tracker);
        directory.set_connection_hooks(
            Arc::new(move |server: &str, actor: &Actor| {
                let tracker = Arc::clone(&on_join);
                let server = server.to_owned();
                let actor = actor.clone();
                tokio::spawn(async move {
                    tracker.on_server_connected(&server, &actor).await;
                });
            }),
            Arc::new(move |actor_id| on_leave.on_disconnect(actor_id)),
        );

        directory.connect("lobby", Actor::new("steve"));
        tokio::task::yield_now().await;

        let greetings = presenter
            .events()
            .iter()
            .filter(|e| matches!(e, PresentedEvent::DirectChat { .. }))
            .count();
        assert_eq!(greetings, 1);
    }

    #[tokio::test]
    async fn disconnect_resets_the_visited_set() {
        let (_dir, presenter, tracker) = tracker();
        let actor = Actor::new("steve");

        tracker.on_server_connected("lobby", &actor).await;
        tracker.on_disconnect(actor.id);
        tracker.on_server_connected("lobby", &actor).await;

        assert_eq!(presenter.events().len(), 2);
    }
}
