//! On-disk configuration store.
//!
//! Layout under the data directory:
//!
//! ```text
//! config.yaml
//! messages.yaml
//! streamers.yaml
//! servers/<server>/chat-announcements.yaml
//! servers/<server>/bossbar-announcements.yaml
//! servers/<server>/title-announcements.yaml
//! servers/<server>/subtitle-announcements.yaml
//! servers/<server>/advancement-announcements.yaml
//! ```
//!
//! The store keeps a cached copy of every tree; `reload()` re-reads the lot.
//! Unparseable or missing files degrade to defaults with a warning; nothing
//! in this crate fails the caller over a malformed file.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::RwLock,
};

use {
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_yaml::Value,
    tracing::{debug, warn},
};

use crate::{
    error::{Context, Result},
    messages::Messages,
    schema::HeraldConfig,
};

/// Announcement files maintained per server, one per channel type.
pub const ANNOUNCEMENT_FILES: &[&str] = &[
    "chat-announcements.yaml",
    "bossbar-announcements.yaml",
    "title-announcements.yaml",
    "subtitle-announcements.yaml",
    "advancement-announcements.yaml",
];

/// One announcements file: `announcements: { <id>: { ...entry... } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementsFile {
    #[serde(default)]
    pub announcements: BTreeMap<String, Value>,
}

/// Per-server trees keyed by section (`chat_announcements`, ...).
pub type ServerConfigs = HashMap<String, HashMap<String, AnnouncementsFile>>;

struct Inner {
    main: HeraldConfig,
    messages: Messages,
    streamers: Value,
    servers: ServerConfigs,
}

pub struct ConfigStore {
    data_dir: PathBuf,
    inner: RwLock<Inner>,
}

/// `chat-announcements.yaml` → `chat_announcements`.
#[must_use]
pub fn section_key(file_name: &str) -> String {
    file_name
        .trim_end_matches(".yaml")
        .trim_end_matches(".yml")
        .replace('-', "_")
}

impl ConfigStore {
    /// Load everything under `data_dir`, creating the directory skeleton on
    /// first run.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(data_dir.join("servers")).context("create data directory")?;
        let inner = read_all(&data_dir)?;
        Ok(Self {
            data_dir: data_dir.clone(),
            inner: RwLock::new(inner),
        })
    }

    /// Re-read every file from disk and swap the cached trees.
    pub fn reload(&self) -> Result<()> {
        let fresh = read_all(&self.data_dir)?;
        if let Ok(mut inner) = self.inner.write() {
            *inner = fresh;
        }
        debug!("configuration reloaded");
        Ok(())
    }

    /// Snapshot of the typed main configuration.
    #[must_use]
    pub fn main(&self) -> HeraldConfig {
        self.inner
            .read()
            .map(|i| i.main.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the message catalog.
    #[must_use]
    pub fn messages(&self) -> Messages {
        self.inner
            .read()
            .map(|i| i.messages.clone())
            .unwrap_or_default()
    }

    /// Raw `streamers.yaml` tree.
    #[must_use]
    pub fn streamers_tree(&self) -> Value {
        self.inner
            .read()
            .map(|i| i.streamers.clone())
            .unwrap_or(Value::Null)
    }

    /// Snapshot of every server's announcement trees.
    #[must_use]
    pub fn server_configs(&self) -> ServerConfigs {
        self.inner
            .read()
            .map(|i| i.servers.clone())
            .unwrap_or_default()
    }

    /// Make sure `server` has a config directory with all announcement
    /// files, creating empty ones as needed.
    pub fn ensure_server(&self, server: &str) -> Result<()> {
        let dir = self.data_dir.join("servers").join(server);
        std::fs::create_dir_all(&dir).with_context(|| format!("create server dir {server}"))?;

        let mut created = false;
        for file in ANNOUNCEMENT_FILES {
            let path = dir.join(file);
            if !path.exists() {
                write_yaml(&path, &AnnouncementsFile::default())?;
                created = true;
            }
        }
        if created {
            if let Ok(mut inner) = self.inner.write() {
                let entry = inner.servers.entry(server.to_owned()).or_default();
                for file in ANNOUNCEMENT_FILES {
                    entry.entry(section_key(file)).or_default();
                }
            }
        }
        Ok(())
    }

    /// Replace one announcement entry and persist the owning file.
    ///
    /// Exactly one file write per call.
    pub fn upsert_announcement(
        &self,
        server: &str,
        file_name: &str,
        id: &str,
        entry: Value,
    ) -> Result<()> {
        let file = {
            let mut inner = self
                .inner
                .write()
                .map_err(|_| crate::Error::Message("config store lock poisoned".into()))?;
            let section = inner
                .servers
                .entry(server.to_owned())
                .or_default()
                .entry(section_key(file_name))
                .or_default();
            section.announcements.insert(id.to_owned(), entry);
            section.clone()
        };

        let path = self.data_dir.join("servers").join(server).join(file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("create server dir")?;
        }
        write_yaml(&path, &file)
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn read_all(data_dir: &Path) -> Result<Inner> {
    let main: HeraldConfig = load_yaml_or_default(&data_dir.join("config.yaml"));
    let messages_tree: Value = load_yaml_or_default(&data_dir.join("messages.yaml"));
    let streamers: Value = load_yaml_or_default(&data_dir.join("streamers.yaml"));
    let servers = read_server_configs(&data_dir.join("servers"))?;

    Ok(Inner {
        main,
        messages: Messages::new(messages_tree),
        streamers,
        servers,
    })
}

fn read_server_configs(servers_dir: &Path) -> Result<ServerConfigs> {
    let mut out = ServerConfigs::new();
    if !servers_dir.exists() {
        return Ok(out);
    }

    for dir in std::fs::read_dir(servers_dir).context("read servers directory")? {
        let dir = dir.context("read servers directory entry")?;
        if !dir.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let server = dir.file_name().to_string_lossy().into_owned();

        let mut sections = HashMap::new();
        for file in ANNOUNCEMENT_FILES {
            let path = dir.path().join(file);
            let parsed: AnnouncementsFile = load_yaml_or_default(&path);
            sections.insert(section_key(file), parsed);
        }
        out.insert(server, sections);
    }
    Ok(out)
}

/// Read and parse a YAML file; any failure logs and yields `T::default()`.
fn load_yaml_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "config file missing, using defaults");
            return T::default();
        },
    };
    match serde_yaml::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed config file, using defaults");
            T::default()
        },
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_yaml::to_string(value)?;
    std::fs::write(path, raw).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn fresh_dir_yields_defaults() {
        let (_dir, store) = store();
        assert!(store.main().announcements.enabled);
        assert!(store.server_configs().is_empty());
    }

    #[test]
    fn ensure_server_creates_all_files() {
        let (dir, store) = store();
        store.ensure_server("lobby").unwrap();

        for file in ANNOUNCEMENT_FILES {
            assert!(dir.path().join("servers/lobby").join(file).exists());
        }
        let configs = store.server_configs();
        assert_eq!(configs["lobby"].len(), ANNOUNCEMENT_FILES.len());
    }

    #[test]
    fn upsert_round_trips_through_reload() {
        let (_dir, store) = store();
        let entry: Value = serde_yaml::from_str("{message: '<red>hi</red>', interval: 60}").unwrap();
        store
            .upsert_announcement("lobby", "chat-announcements.yaml", "motd", entry)
            .unwrap();

        store.reload().unwrap();
        let configs = store.server_configs();
        let chat = &configs["lobby"]["chat_announcements"];
        assert_eq!(
            chat.announcements["motd"].get("interval").unwrap(),
            &Value::from(60)
        );
    }

    #[test]
    fn malformed_main_config_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), ": not [ yaml").unwrap();
        let store = ConfigStore::load(dir.path()).unwrap();
        assert!(store.main().announcements.enabled);
    }

    #[test]
    fn section_key_normalizes_file_names() {
        assert_eq!(section_key("chat-announcements.yaml"), "chat_announcements");
        assert_eq!(
            section_key("bossbar-announcements.yml"),
            "bossbar_announcements"
        );
    }
}
