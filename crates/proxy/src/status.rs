//! Periodic reachability tracking for backend servers.

use {
    crate::directory::ServerDirectory,
    dashmap::DashMap,
    std::{sync::Arc, time::Duration},
    tokio::{
        sync::{Mutex, Notify, RwLock},
        task::JoinHandle,
    },
    tracing::{debug, info},
};

/// Invoked on every online/offline transition with `(server, online)`.
pub type StatusChangeFn = Arc<dyn Fn(&str, bool) + Send + Sync>;

/// Polls the directory and remembers the last observed reachability of
/// every server, firing a callback when it flips.
pub struct StatusMonitor {
    directory: Arc<dyn ServerDirectory>,
    assume_all_online: bool,
    check_interval: Duration,
    status: DashMap<String, bool>,
    on_change: Option<StatusChangeFn>,
    running: RwLock<bool>,
    shutdown: Notify,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StatusMonitor {
    #[must_use]
    pub fn new(
        directory: Arc<dyn ServerDirectory>,
        assume_all_online: bool,
        check_interval_secs: u64,
        on_change: Option<StatusChangeFn>,
    ) -> Arc<Self> {
        Arc::new(Self {
            directory,
            assume_all_online,
            check_interval: Duration::from_secs(check_interval_secs.max(1)),
            status: DashMap::new(),
            on_change,
            running: RwLock::new(false),
            shutdown: Notify::new(),
            poll_handle: Mutex::new(None),
        })
    }

    /// Whether a server counts as online. With `assume_all_online` the
    /// answer is always yes; otherwise servers never seen yet are offline.
    #[must_use]
    pub fn is_online(&self, server: &str) -> bool {
        if self.assume_all_online {
            return true;
        }
        self.status.get(server).is_some_and(|entry| *entry)
    }

    pub async fn start(self: &Arc<Self>) {
        if self.assume_all_online {
            debug!("status polling disabled, every server assumed online");
            return;
        }
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }
        self.poll_once();

        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            monitor.poll_loop().await;
        });
        *self.poll_handle.lock().await = Some(handle);
        info!(interval = ?self.check_interval, "server status monitor started");
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
        info!("server status monitor stopped");
    }

    async fn poll_loop(self: Arc<Self>) {
        loop {
            tokio::select! {
                () = tokio::time::sleep(self.check_interval) => {}
                () = self.shutdown.notified() => break,
            }
            if !*self.running.read().await {
                break;
            }
            self.poll_once();
        }
    }

    /// One poll pass. Public so tests can drive transitions without the
    /// background task. A no-op when `assume_all_online` is set.
    pub fn poll_once(&self) {
        if self.assume_all_online {
            return;
        }
        for server in self.directory.list_servers() {
            let online = self
                .directory
                .server(&server)
                .is_some_and(|snap| snap.reachable);
            let previous = self.status.insert(server.clone(), online);
            let changed = match previous {
                Some(was) => was != online,
                None => online,
            };
            if changed {
                info!(server, online, "server status changed");
                if let Some(on_change) = &self.on_change {
                    on_change(&server, online);
                }
            } else {
                debug!(server, online, "server status unchanged");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::directory::InMemoryDirectory,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test]
    async fn unknown_server_follows_assume_all_online() {
        let dir = Arc::new(InMemoryDirectory::new());
        let optimistic = StatusMonitor::new(dir.clone(), true, 30, None);
        let pessimistic = StatusMonitor::new(dir, false, 30, None);
        assert!(optimistic.is_online("never-seen"));
        assert!(!pessimistic.is_online("never-seen"));
    }

    #[tokio::test]
    async fn transition_fires_callback_once() {
        let dir = Arc::new(InMemoryDirectory::new());
        dir.register("lobby");

        let flips = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&flips);
        let on_change: StatusChangeFn = Arc::new(move |_server, _online| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let monitor = StatusMonitor::new(dir.clone(), false, 30, Some(on_change));
        monitor.poll_once();
        assert_eq!(flips.load(Ordering::SeqCst), 1);
        assert!(monitor.is_online("lobby"));

        dir.set_reachable("lobby", false);
        monitor.poll_once();
        assert_eq!(flips.load(Ordering::SeqCst), 2);
        assert!(!monitor.is_online("lobby"));

        monitor.poll_once();
        assert_eq!(flips.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn assume_all_online_never_reports_offline() {
        let dir = Arc::new(InMemoryDirectory::new());
        dir.register("lobby");

        let flips = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&flips);
        let on_change: StatusChangeFn = Arc::new(move |_server, _online| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let monitor = StatusMonitor::new(dir.clone(), true, 30, Some(on_change));
        monitor.start().await;
        dir.set_reachable("lobby", false);
        monitor.poll_once();

        assert!(monitor.is_online("lobby"));
        assert_eq!(flips.load(Ordering::SeqCst), 0);
        monitor.stop().await;
    }
}
