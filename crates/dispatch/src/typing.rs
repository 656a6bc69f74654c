//! Character-by-character chat reveal.

use {
    herald_common::markup::strip_tags,
    herald_proxy::{Actor, Presenter},
    std::{sync::Arc, time::Duration},
    tokio::task::JoinHandle,
};

/// Reveal `markup`'s plain text to one actor a character at a time. Messages
/// longer than `max_chars` are sent whole instead; the effect would take too
/// long to be readable.
pub fn spawn_reveal(
    presenter: Arc<dyn Presenter>,
    actor: Actor,
    markup: &str,
    delay_ms: u64,
    max_chars: usize,
) -> JoinHandle<()> {
    let plain = strip_tags(markup);
    let markup = markup.to_owned();
    tokio::spawn(async move {
        let chars: Vec<char> = plain.chars().collect();
        if chars.len() > max_chars {
            presenter.send_chat_to(&actor, &markup).await;
            return;
        }
        let mut partial = String::with_capacity(plain.len());
        for c in chars {
            partial.push(c);
            presenter.send_chat_to(&actor, &partial).await;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        herald_proxy::{PresentedEvent, RecordingPresenter},
    };

    #[tokio::test(start_paused = true)]
    async fn reveals_one_char_per_tick() {
        let presenter = Arc::new(RecordingPresenter::new());
        let handle = spawn_reveal(presenter.clone(), Actor::new("steve"), "<red>abc</red>", 50, 100);
        handle.await.unwrap();

        let texts: Vec<String> = presenter
            .events()
            .into_iter()
            .map(|e| match e {
                PresentedEvent::DirectChat { markup, .. } => markup,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["a", "ab", "abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn long_messages_fall_back_to_one_send() {
        let presenter = Arc::new(RecordingPresenter::new());
        let long = "x".repeat(150);
        let handle = spawn_reveal(presenter.clone(), Actor::new("steve"), &long, 50, 100);
        handle.await.unwrap();

        assert_eq!(presenter.events().len(), 1);
    }
}
