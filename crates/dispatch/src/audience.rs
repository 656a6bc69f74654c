//! Audience selection: who on the server may see an announcement.

use {
    herald_catalog::Announcement,
    herald_proxy::{Actor, PermissionOracle},
};

/// Node checked when an announcement declares a permission requirement.
#[must_use]
pub fn permission_node(base: &str, announcement: &Announcement) -> String {
    format!(
        "{base}.announcement.{}.{}.{}",
        announcement.kind.permission_fragment(),
        announcement.server_id,
        announcement.id
    )
}

/// Filter connected actors down to those allowed to see the announcement.
/// Without a permission requirement everyone qualifies.
#[must_use]
pub fn select(
    actors: &[Actor],
    announcement: &Announcement,
    permissions: &dyn PermissionOracle,
    base: &str,
) -> Vec<Actor> {
    if announcement.permission.is_none() {
        return actors.to_vec();
    }
    let node = permission_node(base, announcement);
    actors
        .iter()
        .filter(|actor| permissions.has_permission(actor, &node))
        .cloned()
        .collect()
}
