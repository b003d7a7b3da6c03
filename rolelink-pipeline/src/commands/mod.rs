//! Moderator role commands.
//!
//! `give_role` and `remove_role` change a single role on a single member,
//! after the permission registry has cleared the caller. Each successful
//! command is audited with the acting moderator.
use std::sync::Arc;

use rolelink_shared::types::{AuditAction, AuditEvent, MemberContext, MemberId, RoleId};
use tracing::{info, instrument};

use crate::audit::AuditLogger;
use crate::directory::Directory;
use crate::errors::CommandError;
use crate::permissions::PermissionRegistry;

pub const GIVE_ROLE: &str = "give_role";
pub const REMOVE_ROLE: &str = "remove_role";

pub struct RoleCommands {
    registry: PermissionRegistry,
    directory: Arc<dyn Directory>,
    audit: AuditLogger,
}

impl RoleCommands {
    pub fn new(
        registry: PermissionRegistry,
        directory: Arc<dyn Directory>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            registry,
            directory,
            audit,
        }
    }

    /// Gives `role_id` to `target` on behalf of `moderator`.
    ///
    /// # Returns
    ///
    /// The recorded audit event, `CommandError::Forbidden` if the moderator is
    /// not allowed to run the command, or the directory failure.
    #[instrument(
        skip(self, moderator),
        fields(guild_id = %moderator.guild_id, moderator_id = %moderator.member_id)
    )]
    pub async fn give_role(
        &self,
        moderator: &MemberContext,
        target: MemberId,
        role_id: RoleId,
    ) -> Result<AuditEvent, CommandError> {
        self.run(moderator, GIVE_ROLE, AuditAction::ManualGrant, target, role_id)
            .await
    }

    /// Removes `role_id` from `target` on behalf of `moderator`.
    #[instrument(
        skip(self, moderator),
        fields(guild_id = %moderator.guild_id, moderator_id = %moderator.member_id)
    )]
    pub async fn remove_role(
        &self,
        moderator: &MemberContext,
        target: MemberId,
        role_id: RoleId,
    ) -> Result<AuditEvent, CommandError> {
        self.run(moderator, REMOVE_ROLE, AuditAction::ManualRevoke, target, role_id)
            .await
    }

    async fn run(
        &self,
        moderator: &MemberContext,
        command: &str,
        action: AuditAction,
        target: MemberId,
        role_id: RoleId,
    ) -> Result<AuditEvent, CommandError> {
        if !self.registry.authorize(moderator, command) {
            return Err(CommandError::Forbidden(command.to_string()));
        }

        let guild_id = moderator.guild_id;
        let reason = format!("/{command} by {}", moderator.member_id);
        if action.is_grant() {
            self.directory.add_role(guild_id, target, role_id, &reason).await?;
        } else {
            self.directory.remove_role(guild_id, target, role_id, &reason).await?;
        }
        info!(
            target_id = %target,
            role_id = %role_id,
            action = %action,
            "Manual role change applied"
        );

        let event = AuditEvent::manual(guild_id, target, action, role_id, moderator.member_id);
        self.audit.record(&event).await;
        Ok(event)
    }
}
