use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ChannelId, GuildId, RoleGraph, RoleId};

/// Command name → role ids allowed to run it, for a single guild.
pub type CommandPermissions = BTreeMap<String, Vec<RoleId>>;

/// The persisted configuration document.
///
/// Every top-level key defaults to an empty map so that partially written or
/// older files still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub role_connections: BTreeMap<GuildId, RoleGraph>,
    #[serde(default)]
    pub log_channels: BTreeMap<GuildId, ChannelId>,
    #[serde(default)]
    pub command_permissions: BTreeMap<GuildId, CommandPermissions>,
}

impl ConfigDocument {
    pub fn graph(&self, guild_id: GuildId) -> Option<&RoleGraph> {
        self.role_connections.get(&guild_id)
    }

    /// Mutable graph for `guild_id`, created empty on first use.
    pub fn graph_mut(&mut self, guild_id: GuildId) -> &mut RoleGraph {
        self.role_connections.entry(guild_id).or_default()
    }

    pub fn log_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.log_channels.get(&guild_id).copied()
    }

    pub fn allowed_roles(&self, guild_id: GuildId, command: &str) -> Option<&[RoleId]> {
        self.command_permissions
            .get(&guild_id)
            .and_then(|commands| commands.get(command))
            .map(Vec::as_slice)
    }
}
