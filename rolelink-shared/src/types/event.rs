use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{GuildId, MemberId, RoleId};

/// A member's role set before and after a change, as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeEvent {
    pub guild_id: GuildId,
    pub member_id: MemberId,
    #[serde(default)]
    pub roles_before: BTreeSet<RoleId>,
    #[serde(default)]
    pub roles_after: BTreeSet<RoleId>,
}

impl RoleChangeEvent {
    pub fn member_key(&self) -> MemberKey {
        MemberKey {
            guild_id: self.guild_id,
            member_id: self.member_id,
        }
    }
}

/// The unit of serialization: all work for one member of one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey {
    pub guild_id: GuildId,
    pub member_id: MemberId,
}

/// Roles gained and lost between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    pub added: BTreeSet<RoleId>,
    pub removed: BTreeSet<RoleId>,
}

impl RoleDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
