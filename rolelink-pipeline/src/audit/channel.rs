use std::sync::Arc;

use async_trait::async_trait;
use rolelink_repository::ConfigRepository;
use rolelink_shared::types::{AuditEvent, GuildId, RoleId};
use tracing::debug;

use crate::audit::{AuditSink, render_message};
use crate::directory::Directory;
use crate::errors::AuditError;

/// Posts audit events to the guild's configured log channel.
///
/// Guilds without a log channel are skipped silently. A configured channel
/// that no longer exists surfaces as `NotFound`, which the logger reports.
pub struct ChannelAuditSink {
    directory: Arc<dyn Directory>,
    repository: Arc<dyn ConfigRepository>,
}

impl ChannelAuditSink {
    pub fn new(directory: Arc<dyn Directory>, repository: Arc<dyn ConfigRepository>) -> Self {
        Self {
            directory,
            repository,
        }
    }

    /// Resolves a role name, falling back to the raw id for deleted roles.
    async fn role_label(&self, guild_id: GuildId, role_id: RoleId) -> String {
        match self.directory.get_role(guild_id, role_id).await {
            Ok(role) => role.name,
            Err(_) => role_id.to_string(),
        }
    }
}

#[async_trait]
impl AuditSink for ChannelAuditSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn publish(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let Some(channel_id) = self.repository.snapshot().log_channel(event.guild_id) else {
            debug!(guild_id = %event.guild_id, "No log channel configured");
            return Ok(());
        };
        let channel = self.directory.get_channel(event.guild_id, channel_id).await?;

        let mut role_names = Vec::with_capacity(event.roles.len());
        for role_id in &event.roles {
            role_names.push(self.role_label(event.guild_id, *role_id).await);
        }
        let trigger_name = match event.trigger {
            Some(trigger) => Some(self.role_label(event.guild_id, trigger).await),
            None => None,
        };

        let content = render_message(event, &role_names, trigger_name.as_deref());
        self.directory.send_message(channel.id, &content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLogger;
    use crate::directory::MockDirectory;
    use crate::errors::DirectoryError;
    use rolelink_repository::InMemoryConfigRepository;
    use rolelink_shared::types::{AuditAction, ChannelId, MemberId};

    const GUILD: GuildId = GuildId(1);

    async fn setup(log_channel: Option<ChannelId>) -> (Arc<MockDirectory>, ChannelAuditSink) {
        let directory = Arc::new(MockDirectory::new());
        directory.register_role(GUILD, RoleId(10), "Members");
        directory.register_role(GUILD, RoleId(20), "Verified");
        directory.register_channel(GUILD, ChannelId(99), "audit-log");

        let repository = Arc::new(InMemoryConfigRepository::new());
        if let Some(channel_id) = log_channel {
            repository
                .mutate(&mut |config| {
                    config.log_channels.insert(GUILD, channel_id);
                    true
                })
                .await
                .unwrap();
        }

        let sink = ChannelAuditSink::new(directory.clone(), repository);
        (directory, sink)
    }

    fn grant_event() -> AuditEvent {
        AuditEvent::automatic(
            GUILD,
            MemberId(5),
            AuditAction::AutoGrant,
            RoleId(10),
            vec![RoleId(20), RoleId(30)],
        )
    }

    #[tokio::test]
    async fn test_posts_rendered_message_to_log_channel() {
        let (directory, sink) = setup(Some(ChannelId(99))).await;
        sink.publish(&grant_event()).await.unwrap();

        let messages = directory.sent_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, ChannelId(99));
        assert!(messages[0].1.contains("Verified, 30"));
        assert!(messages[0].1.contains("'Members'"));
    }

    #[tokio::test]
    async fn test_skips_guild_without_log_channel() {
        let (directory, sink) = setup(None).await;
        sink.publish(&grant_event()).await.unwrap();
        assert!(directory.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_channel_is_reported() {
        let (_directory, sink) = setup(Some(ChannelId(42))).await;
        let result = sink.publish(&grant_event()).await;
        assert!(matches!(
            result,
            Err(AuditError::Directory(DirectoryError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed_by_logger() {
        let (directory, sink) = setup(Some(ChannelId(99))).await;
        directory.fail_next_message(DirectoryError::RateLimited { retry_after_ms: 100 });

        let logger = AuditLogger::new().with_sink(Arc::new(sink));
        logger.record(&grant_event()).await;

        assert!(directory.sent_messages().is_empty());
    }
}
