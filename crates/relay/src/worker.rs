//! Bounded queue and the background delivery task.

use {
    crate::job::RelayJob,
    tokio::{
        sync::mpsc,
        task::JoinHandle,
    },
    tracing::{debug, trace},
};

/// Cloneable producer side of the relay queue.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayJob>,
}

impl RelayHandle {
    /// Create a queue of `capacity` jobs plus its consumer end.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RelayJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queue a job without waiting. A full queue drops the job; webhooks
    /// never exert backpressure on the send path.
    pub fn enqueue(&self, job: RelayJob) {
        if let Err(e) = self.tx.try_send(job) {
            debug!(error = %e, "relay queue full, dropping webhook job");
        }
    }
}

/// Drains the queue, posting one job at a time.
pub struct RelayWorker {
    handle: JoinHandle<()>,
}

impl RelayWorker {
    #[must_use]
    pub fn spawn(client: reqwest::Client, mut rx: mpsc::Receiver<RelayJob>) -> Self {
        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                deliver(&client, &job).await;
            }
            debug!("relay queue closed, worker exiting");
        });
        Self { handle }
    }

    /// Wait for the worker to drain and exit. Callers drop every
    /// [`RelayHandle`] first; the worker stops once the queue closes.
    pub async fn shutdown(self) {
        let _ = self.handle.await;
    }
}

async fn deliver(client: &reqwest::Client, job: &RelayJob) {
    let result = client.post(job.url()).json(&job.payload()).send().await;
    match result {
        Ok(response) => trace!(status = %response.status(), "webhook delivered"),
        Err(e) => debug!(error = %e, "webhook delivery failed"),
    }
}
