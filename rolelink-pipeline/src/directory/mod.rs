//! The directory collaborator: the external service that owns guilds, roles,
//! members and channels.
//!
//! This module provides:
//! - [`Directory`] the narrow capability trait the pipeline depends on
//! - [`MockDirectory`] an in-memory implementation for tests and replay runs

mod mock;

pub use mock::{DirectoryCall, DirectoryFixture, GuildFixture, MockDirectory};

use async_trait::async_trait;
use rolelink_shared::types::{Channel, ChannelId, GuildId, MemberId, Role, RoleId};

use crate::errors::DirectoryError;

/// Capabilities the pipeline needs from the directory.
///
/// Calls are rate limited by the remote side and may be rejected for missing
/// privileges or deleted targets; see [`DirectoryError`] for the taxonomy.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Adds `role_id` to a member. `reason` ends up in the directory's own
    /// audit trail.
    async fn add_role(
        &self,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), DirectoryError>;

    /// Removes `role_id` from a member.
    async fn remove_role(
        &self,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), DirectoryError>;

    async fn get_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<Role, DirectoryError>;

    async fn get_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Channel, DirectoryError>;

    /// Posts a plain text message to a channel.
    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), DirectoryError>;
}
