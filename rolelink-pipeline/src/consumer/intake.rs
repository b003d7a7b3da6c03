use rolelink_shared::types::{RoleChangeEvent, RoleDelta};

/// Computes which roles a member gained and lost in `event`.
///
/// Stateless: nothing is remembered between events. Identical snapshots give
/// an empty delta.
pub fn diff_roles(event: &RoleChangeEvent) -> RoleDelta {
    RoleDelta {
        added: event
            .roles_after
            .difference(&event.roles_before)
            .copied()
            .collect(),
        removed: event
            .roles_before
            .difference(&event.roles_after)
            .copied()
            .collect(),
    }
}
