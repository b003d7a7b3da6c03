use std::sync::Arc;

use rolelink_repository::ConfigRepository;
use rolelink_shared::types::{ChannelId, GuildId};
use serde::Serialize;
use tracing::info;

use crate::errors::StoreError;

/// Summary of one guild's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildOverview {
    pub guild_id: GuildId,
    pub log_channel: Option<ChannelId>,
    /// Number of parent roles with connections.
    pub connections: usize,
    /// Number of commands with at least one allowed role.
    pub permissions: usize,
}

/// Log channel settings and configuration overview.
#[derive(Clone)]
pub struct GuildSettingsStore {
    repository: Arc<dyn ConfigRepository>,
}

impl GuildSettingsStore {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        Self { repository }
    }

    /// Sets the channel that receives audit messages for `guild_id`.
    pub async fn set_log_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<(), StoreError> {
        self.repository
            .mutate(&mut |config| {
                config.log_channels.insert(guild_id, channel_id) != Some(channel_id)
            })
            .await?;
        info!(guild_id = %guild_id, channel_id = %channel_id, "Log channel set");
        Ok(())
    }

    pub fn log_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.repository.snapshot().log_channel(guild_id)
    }

    pub fn overview(&self, guild_id: GuildId) -> GuildOverview {
        let config = self.repository.snapshot();
        GuildOverview {
            guild_id,
            log_channel: config.log_channel(guild_id),
            connections: config.graph(guild_id).map_or(0, |graph| graph.len()),
            permissions: config
                .command_permissions
                .get(&guild_id)
                .map_or(0, |commands| commands.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolelink_repository::InMemoryConfigRepository;
    use rolelink_shared::types::RoleId;

    #[tokio::test]
    async fn test_set_log_channel_overwrites() {
        let repository = Arc::new(InMemoryConfigRepository::new());
        let settings = GuildSettingsStore::new(repository.clone());

        assert_eq!(settings.log_channel(GuildId(1)), None);
        settings.set_log_channel(GuildId(1), ChannelId(5)).await.unwrap();
        settings.set_log_channel(GuildId(1), ChannelId(5)).await.unwrap();
        settings.set_log_channel(GuildId(1), ChannelId(6)).await.unwrap();

        assert_eq!(settings.log_channel(GuildId(1)), Some(ChannelId(6)));
        assert_eq!(repository.save_count(), 2);
    }

    #[tokio::test]
    async fn test_overview_counts_configuration() {
        let repository = Arc::new(InMemoryConfigRepository::new());
        repository
            .mutate(&mut |config| {
                config.graph_mut(GuildId(1)).connect(RoleId(10), [RoleId(11)]);
                config.graph_mut(GuildId(1)).connect(RoleId(20), [RoleId(21)]);
                config
                    .command_permissions
                    .entry(GuildId(1))
                    .or_default()
                    .insert("give_role".to_string(), vec![RoleId(10)]);
                true
            })
            .await
            .unwrap();
        let settings = GuildSettingsStore::new(repository);
        settings.set_log_channel(GuildId(1), ChannelId(9)).await.unwrap();

        assert_eq!(
            settings.overview(GuildId(1)),
            GuildOverview {
                guild_id: GuildId(1),
                log_channel: Some(ChannelId(9)),
                connections: 2,
                permissions: 1,
            }
        );
        assert_eq!(settings.overview(GuildId(2)).connections, 0);
    }
}
