use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{ChannelId, GuildId, MemberId, RoleId};

/// A role as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A text channel as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
}

/// Guild-level permissions a member holds in the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPermissions {
    #[serde(default)]
    pub administrator: bool,
    #[serde(default)]
    pub manage_roles: bool,
}

impl MemberPermissions {
    /// Whether either permission lets the member manage roles directly.
    pub fn is_elevated(&self) -> bool {
        self.administrator || self.manage_roles
    }
}

/// Snapshot of a member taken when a command is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberContext {
    pub guild_id: GuildId,
    pub member_id: MemberId,
    pub role_ids: BTreeSet<RoleId>,
    #[serde(default)]
    pub permissions: MemberPermissions,
}
