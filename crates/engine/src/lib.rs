//! Timer-driven readiness engine.
//!
//! A background loop wakes every `check-frequency` seconds, walks the
//! scheduled announcements, and hands the due ones to the dispatcher. All
//! readiness arithmetic is parameterized on an epoch-millisecond timestamp
//! so tests can drive ticks synthetically.

use std::{sync::Arc, time::Duration};

use {
    herald_catalog::{Announcement, CatalogService},
    herald_common::time::now_ms,
    herald_config::ConfigStore,
    herald_dispatch::Dispatcher,
    herald_proxy::{ServerDirectory, StatusMonitor},
    tokio::{
        sync::{Mutex, Notify, RwLock},
        task::JoinHandle,
    },
    tracing::{debug, info, trace},
};

pub struct Engine {
    catalog: Arc<CatalogService>,
    dispatcher: Arc<Dispatcher>,
    status: Arc<StatusMonitor>,
    directory: Arc<dyn ServerDirectory>,
    config: Arc<ConfigStore>,
    running: RwLock<bool>,
    shutdown: Notify,
    timer_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>,
        dispatcher: Arc<Dispatcher>,
        status: Arc<StatusMonitor>,
        directory: Arc<dyn ServerDirectory>,
        config: Arc<ConfigStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            dispatcher,
            status,
            directory,
            config,
            running: RwLock::new(false),
            shutdown: Notify::new(),
            timer_handle: Mutex::new(None),
        })
    }

    pub async fn start(self: &Arc<Self>) {
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            engine.timer_loop().await;
        });
        *self.timer_handle.lock().await = Some(handle);
        info!("announcement engine started");
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
        if let Some(handle) = self.timer_handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("announcement engine stopped");
    }

    async fn timer_loop(self: Arc<Self>) {
        loop {
            let frequency = self.config.main().announcements.check_frequency.max(1);
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(frequency)) => {}
                () = self.shutdown.notified() => break,
            }
            if !*self.running.read().await {
                break;
            }
            self.check_announcements_at(now_ms()).await;
        }
    }

    /// One engine tick: dispatch every scheduled announcement that is due
    /// at `now`. Skips are silent per announcement; the batch always runs
    /// to completion.
    pub async fn check_announcements_at(self: &Arc<Self>, now: u64) {
        let main = self.config.main();
        if !main.announcements.enabled {
            trace!("announcements globally disabled, skipping tick");
            return;
        }

        let scheduled = self.catalog.list_scheduled();
        if scheduled.is_empty() {
            return;
        }

        for announcement in scheduled {
            if !announcement.is_due(now) || announcement.is_on_cooldown(now) {
                continue;
            }
            if !self.status.is_online(&announcement.server_id) {
                debug!(
                    server = announcement.server_id,
                    id = announcement.id,
                    "server unreachable, skipping announcement"
                );
                continue;
            }
            let populated = self
                .directory
                .server(&announcement.server_id)
                .is_some_and(|s| !s.actors.is_empty());
            if !populated {
                continue;
            }
            if !announcement.begin_send() {
                debug!(id = announcement.id, "dispatch already in flight, skipping");
                continue;
            }

            if main.performance.defer_sends {
                let dispatcher = Arc::clone(&self.dispatcher);
                tokio::spawn(async move {
                    dispatch_one(&dispatcher, &announcement, now).await;
                });
            } else {
                dispatch_one(&self.dispatcher, &announcement, now).await;
            }
        }
    }
}

async fn dispatch_one(dispatcher: &Arc<Dispatcher>, announcement: &Arc<Announcement>, now: u64) {
    debug!(
        server = announcement.server_id,
        kind = %announcement.kind,
        id = announcement.id,
        "dispatching scheduled announcement"
    );
    dispatcher.send_at(announcement, &[], now).await;
    announcement.finish_send();
}
