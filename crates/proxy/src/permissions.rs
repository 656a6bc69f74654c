//! Permission checks against the proxy's permission provider.

use {crate::types::Actor, dashmap::DashMap, uuid::Uuid};

/// Answers "may this actor use this node?" for dotted permission nodes.
pub trait PermissionOracle: Send + Sync {
    fn has_permission(&self, actor: &Actor, node: &str) -> bool;
}

/// Grants everything. Used when no permission provider is wired in.
#[derive(Default)]
pub struct AllowAllPermissions;

impl PermissionOracle for AllowAllPermissions {
    fn has_permission(&self, _actor: &Actor, _node: &str) -> bool {
        true
    }
}

/// Fixed per-actor grant table, mainly for tests and the demo binary.
#[derive(Default)]
pub struct StaticPermissions {
    grants: DashMap<Uuid, Vec<String>>,
}

impl StaticPermissions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, actor_id: Uuid, node: impl Into<String>) {
        self.grants.entry(actor_id).or_default().push(node.into());
    }
}

impl PermissionOracle for StaticPermissions {
    fn has_permission(&self, actor: &Actor, node: &str) -> bool {
        self.grants
            .get(&actor.id)
            .is_some_and(|nodes| nodes.iter().any(|n| n == node))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn static_permissions_only_match_exact_nodes() {
        let perms = StaticPermissions::new();
        let actor = Actor::new("steve");
        perms.grant(actor.id, "herald.reload");

        assert!(perms.has_permission(&actor, "herald.reload"));
        assert!(!perms.has_permission(&actor, "herald.admin"));
        assert!(!perms.has_permission(&Actor::new("alex"), "herald.reload"));
    }

    #[test]
    fn allow_all_grants_everything() {
        let perms = AllowAllPermissions;
        assert!(perms.has_permission(&Actor::new("anyone"), "any.node.at.all"));
    }
}
