use std::sync::Arc;

use rolelink_repository::ConfigRepository;
use rolelink_shared::types::{GuildId, RoleGraph, RoleId};
use tracing::info;

use crate::errors::StoreError;

/// Upper bound on the number of children a single parent may list.
pub const MAX_CHILDREN_PER_PARENT: usize = 15;

/// Reads and edits the per-guild parent → children role graph.
#[derive(Clone)]
pub struct RoleGraphStore {
    repository: Arc<dyn ConfigRepository>,
}

impl RoleGraphStore {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        Self { repository }
    }

    /// Replaces the children of `parent` wholesale.
    ///
    /// Duplicates are removed keeping the first occurrence. After
    /// de-duplication the list must hold between 1 and
    /// [`MAX_CHILDREN_PER_PARENT`] roles.
    ///
    /// # Arguments
    ///
    /// * `guild_id` - Guild owning the graph
    /// * `parent` - Role whose addition cascades to the children
    /// * `children` - Child roles, in the order they should be applied
    ///
    /// # Returns
    ///
    /// The stored child list, or a `StoreError` if the count is out of range or
    /// the configuration could not be persisted.
    pub async fn connect(
        &self,
        guild_id: GuildId,
        parent: RoleId,
        children: &[RoleId],
    ) -> Result<Vec<RoleId>, StoreError> {
        let mut unique: Vec<RoleId> = Vec::with_capacity(children.len());
        for child in children {
            if !unique.contains(child) {
                unique.push(*child);
            }
        }
        if unique.is_empty() || unique.len() > MAX_CHILDREN_PER_PARENT {
            return Err(StoreError::InvalidChildCount {
                count: unique.len(),
                max: MAX_CHILDREN_PER_PARENT,
            });
        }

        let document = self
            .repository
            .mutate(&mut |config| {
                let graph = config.graph_mut(guild_id);
                if graph.children(parent) == unique.as_slice() {
                    return false;
                }
                graph.connect(parent, unique.iter().copied());
                true
            })
            .await?;

        info!(
            guild_id = %guild_id,
            parent = %parent,
            children = unique.len(),
            "Roles connected"
        );
        Ok(document
            .graph(guild_id)
            .map(|graph| graph.children(parent).to_vec())
            .unwrap_or(unique))
    }

    /// Removes every connection of `parent`.
    ///
    /// Returns the children that were connected, or
    /// `StoreError::NotConnected` when the parent had none.
    pub async fn disconnect(
        &self,
        guild_id: GuildId,
        parent: RoleId,
    ) -> Result<Vec<RoleId>, StoreError> {
        let mut removed = None;
        self.repository
            .mutate(&mut |config| {
                removed = config
                    .role_connections
                    .get_mut(&guild_id)
                    .and_then(|graph| graph.disconnect(parent));
                let changed = removed.is_some();
                if config.graph(guild_id).is_some_and(RoleGraph::is_empty) {
                    config.role_connections.remove(&guild_id);
                }
                changed
            })
            .await?;

        let removed = removed.ok_or(StoreError::NotConnected(parent))?;
        info!(guild_id = %guild_id, parent = %parent, "Roles disconnected");
        Ok(removed)
    }

    pub fn children_of(&self, guild_id: GuildId, parent: RoleId) -> Vec<RoleId> {
        self.repository
            .snapshot()
            .graph(guild_id)
            .map(|graph| graph.children(parent).to_vec())
            .unwrap_or_default()
    }

    pub fn parents_of(&self, guild_id: GuildId, child: RoleId) -> Vec<RoleId> {
        self.repository
            .snapshot()
            .graph(guild_id)
            .map(|graph| graph.parents_of(child).collect())
            .unwrap_or_default()
    }

    /// Every connection of a guild as `(parent, children)`, ordered by parent id.
    pub fn list_connections(&self, guild_id: GuildId) -> Vec<(RoleId, Vec<RoleId>)> {
        self.repository
            .snapshot()
            .graph(guild_id)
            .map(|graph| {
                graph
                    .iter()
                    .map(|(parent, children)| (parent, children.to_vec()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A consistent copy of one guild's graph, empty when nothing is configured.
    pub fn snapshot(&self, guild_id: GuildId) -> RoleGraph {
        self.repository
            .snapshot()
            .graph(guild_id)
            .cloned()
            .unwrap_or_default()
    }
}
