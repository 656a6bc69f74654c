//! Registry of backend servers and the actors connected to each.

use {
    crate::types::{Actor, ServerSnapshot},
    dashmap::DashMap,
    std::sync::{Arc, RwLock},
    uuid::Uuid,
};

/// Source of truth for which servers exist and who is on them.
pub trait ServerDirectory: Send + Sync {
    /// All known server ids, in no particular order.
    fn list_servers(&self) -> Vec<String>;

    /// Snapshot of one server, or `None` if the id is unknown.
    fn server(&self, id: &str) -> Option<ServerSnapshot>;
}

/// Invoked after an actor lands on a server (including server switches).
pub type ConnectFn = Arc<dyn Fn(&str, &Actor) + Send + Sync>;
/// Invoked after an actor leaves the network entirely.
pub type DisconnectFn = Arc<dyn Fn(Uuid) + Send + Sync>;

/// In-process directory used by the standalone binary and by tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    servers: DashMap<String, ServerSnapshot>,
    on_connect: RwLock<Option<ConnectFn>>,
    on_disconnect: RwLock<Option<DisconnectFn>>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a server; new servers start reachable and empty.
    pub fn register(&self, id: impl Into<String>) {
        self.servers.entry(id.into()).or_insert_with(|| ServerSnapshot {
            reachable: true,
            actors: Vec::new(),
        });
    }

    /// Register connection-lifecycle callbacks. A server switch fires the
    /// connect hook only; the disconnect hook means the actor is gone.
    pub fn set_connection_hooks(&self, on_connect: ConnectFn, on_disconnect: DisconnectFn) {
        if let Ok(mut hook) = self.on_connect.write() {
            *hook = Some(on_connect);
        }
        if let Ok(mut hook) = self.on_disconnect.write() {
            *hook = Some(on_disconnect);
        }
    }

    /// Places an actor on a server, registering the server if needed.
    /// An actor connecting to a second server leaves the first.
    pub fn connect(&self, server: &str, actor: Actor) {
        self.remove_from_servers(actor.id);
        {
            let mut entry = self
                .servers
                .entry(server.to_owned())
                .or_insert_with(|| ServerSnapshot {
                    reachable: true,
                    actors: Vec::new(),
                });
            entry.actors.push(actor.clone());
        }
        let hook = self.on_connect.read().ok().and_then(|h| h.clone());
        if let Some(hook) = hook {
            hook(server, &actor);
        }
    }

    /// Removes an actor from whichever server holds it.
    pub fn disconnect(&self, actor_id: Uuid) {
        self.remove_from_servers(actor_id);
        let hook = self.on_disconnect.read().ok().and_then(|h| h.clone());
        if let Some(hook) = hook {
            hook(actor_id);
        }
    }

    fn remove_from_servers(&self, actor_id: Uuid) {
        for mut entry in self.servers.iter_mut() {
            entry.actors.retain(|a| a.id != actor_id);
        }
    }

    pub fn set_reachable(&self, server: &str, reachable: bool) {
        if let Some(mut entry) = self.servers.get_mut(server) {
            entry.reachable = reachable;
        }
    }
}

impl ServerDirectory for InMemoryDirectory {
    fn list_servers(&self) -> Vec<String> {
        self.servers.iter().map(|e| e.key().clone()).collect()
    }

    fn server(&self, id: &str) -> Option<ServerSnapshot> {
        self.servers.get(id).map(|e| e.value().clone())
    }
}
