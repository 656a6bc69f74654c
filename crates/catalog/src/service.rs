//! Catalog construction and the atomically swappable index.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use {
    herald_config::{ConfigStore, ServerConfigs},
    serde_yaml::Value,
    tracing::{debug, info},
};

use crate::{
    announcement::Announcement,
    error::{Error, Result},
    kind::ChannelKind,
};

/// Persistence seam for announcement mutations. The config store implements
/// this; tests substitute a counter.
pub trait AnnouncementWriter: Send + Sync {
    fn write_announcement(
        &self,
        server: &str,
        kind: ChannelKind,
        id: &str,
        entry: Value,
    ) -> Result<()>;
}

impl AnnouncementWriter for ConfigStore {
    fn write_announcement(
        &self,
        server: &str,
        kind: ChannelKind,
        id: &str,
        entry: Value,
    ) -> Result<()> {
        self.upsert_announcement(server, kind.file_name(), id, entry)?;
        Ok(())
    }
}

type KindIndex = HashMap<ChannelKind, HashMap<String, Arc<Announcement>>>;

/// Immutable announcement index. Rebuilt wholesale on reload; readers always
/// see one consistent generation.
#[derive(Default)]
pub struct Catalog {
    servers: HashMap<String, KindIndex>,
}

impl Catalog {
    /// Parse every announcement tree into an index. Every known server gets
    /// an entry for every kind, empty or not.
    #[must_use]
    pub fn load(configs: &ServerConfigs) -> Self {
        let mut servers = HashMap::new();
        for (server, sections) in configs {
            let mut kinds: KindIndex = HashMap::new();
            for kind in ChannelKind::ALL {
                let mut entries = HashMap::new();
                if let Some(file) = sections.get(kind.section_key()) {
                    for (id, entry) in &file.announcements {
                        entries.insert(
                            id.clone(),
                            Arc::new(Announcement::from_entry(server, kind, id, entry)),
                        );
                    }
                }
                kinds.insert(kind, entries);
            }
            servers.insert(server.clone(), kinds);
        }
        Self { servers }
    }

    #[must_use]
    pub fn get(&self, server: &str, kind: ChannelKind, id: &str) -> Option<Arc<Announcement>> {
        self.servers.get(server)?.get(&kind)?.get(id).cloned()
    }

    #[must_use]
    pub fn server_ids(&self) -> Vec<String> {
        self.servers.keys().cloned().collect()
    }

    /// Ids present for one server and kind, for tab completion.
    #[must_use]
    pub fn ids(&self, server: &str, kind: ChannelKind) -> Vec<String> {
        self.servers
            .get(server)
            .and_then(|kinds| kinds.get(&kind))
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Enabled, scheduled announcements across every server and kind.
    /// Interval and cooldown checks stay with the caller.
    #[must_use]
    pub fn list_scheduled(&self) -> Vec<Arc<Announcement>> {
        let mut out = Vec::new();
        for kinds in self.servers.values() {
            for entries in kinds.values() {
                for announcement in entries.values() {
                    if announcement.enabled() && announcement.scheduled {
                        out.push(Arc::clone(announcement));
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.servers
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle over the current catalog generation.
pub struct CatalogService {
    current: RwLock<Arc<Catalog>>,
    writer: Arc<dyn AnnouncementWriter>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Catalog, writer: Arc<dyn AnnouncementWriter>) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
            writer,
        }
    }

    /// Swap in a freshly loaded catalog. Readers holding the old snapshot
    /// keep it until they drop it.
    pub fn replace(&self, catalog: Catalog) {
        let count = catalog.len();
        if let Ok(mut current) = self.current.write() {
            *current = Arc::new(catalog);
        }
        info!(announcements = count, "catalog replaced");
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .map(|c| Arc::clone(&c))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, server: &str, kind: ChannelKind, id: &str) -> Option<Arc<Announcement>> {
        self.snapshot().get(server, kind, id)
    }

    #[must_use]
    pub fn list_scheduled(&self) -> Vec<Arc<Announcement>> {
        self.snapshot().list_scheduled()
    }

    /// Flip an announcement's enabled flag and persist the change. Exactly
    /// one write per call, including no-op flips.
    pub fn set_enabled(&self, server: &str, kind: ChannelKind, id: &str, enabled: bool) -> Result<()> {
        let announcement =
            self.get(server, kind, id)
                .ok_or_else(|| Error::UnknownAnnouncement {
                    server: server.to_owned(),
                    kind: kind.to_string(),
                    id: id.to_owned(),
                })?;
        announcement.set_enabled(enabled);
        self.writer
            .write_announcement(server, kind, id, announcement.to_yaml())?;
        debug!(server, kind = %kind, id, enabled, "announcement toggled");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        herald_config::AnnouncementsFile,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct CountingWriter {
        writes: AtomicUsize,
    }

    impl AnnouncementWriter for CountingWriter {
        fn write_announcement(
            &self,
            _server: &str,
            _kind: ChannelKind,
            _id: &str,
            _entry: Value,
        ) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn configs(yaml: &str) -> ServerConfigs {
        let mut file = AnnouncementsFile::default();
        let entries: std::collections::BTreeMap<String, Value> =
            serde_yaml::from_str(yaml).unwrap();
        file.announcements = entries;

        let mut sections = HashMap::new();
        sections.insert("chat_announcements".to_owned(), file);
        let mut out = ServerConfigs::new();
        out.insert("lobby".to_owned(), sections);
        out
    }

    #[test]
    fn load_indexes_every_kind_even_when_empty() {
        let catalog = Catalog::load(&configs("{motd: {message: hi}}"));
        assert_eq!(catalog.len(), 1);
        for kind in ChannelKind::ALL {
            assert!(catalog.ids("lobby", kind).len() <= 1);
        }
        assert!(catalog.get("lobby", ChannelKind::Chat, "motd").is_some());
        assert!(catalog.get("lobby", ChannelKind::Title, "motd").is_none());
    }

    #[test]
    fn list_scheduled_filters_disabled_and_unscheduled() {
        let catalog = Catalog::load(&configs(
            "{a: {scheduled: true}, b: {scheduled: true, enabled: false}, c: {}}",
        ));
        let scheduled = catalog.list_scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, "a");
    }

    #[test]
    fn set_enabled_writes_exactly_once_even_when_idempotent() {
        let writer = Arc::new(CountingWriter::default());
        let service = CatalogService::new(
            Catalog::load(&configs("{motd: {message: hi}}")),
            writer.clone(),
        );

        service
            .set_enabled("lobby", ChannelKind::Chat, "motd", false)
            .unwrap();
        assert_eq!(writer.writes.load(Ordering::SeqCst), 1);
        assert!(!service.get("lobby", ChannelKind::Chat, "motd").unwrap().enabled());

        // Flipping to the value it already holds still persists once.
        service
            .set_enabled("lobby", ChannelKind::Chat, "motd", false)
            .unwrap();
        assert_eq!(writer.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_enabled_unknown_id_errors_without_writing() {
        let writer = Arc::new(CountingWriter::default());
        let service = CatalogService::new(Catalog::load(&configs("{}")), writer.clone());
        assert!(service
            .set_enabled("lobby", ChannelKind::Chat, "nope", true)
            .is_err());
        assert_eq!(writer.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn replace_swaps_atomically() {
        let writer = Arc::new(CountingWriter::default());
        let service = CatalogService::new(Catalog::load(&configs("{motd: {}}")), writer);
        let old = service.snapshot();

        service.replace(Catalog::load(&configs("{motd: {}, rules: {}}")));
        assert_eq!(old.len(), 1);
        assert_eq!(service.snapshot().len(), 2);
    }
}
