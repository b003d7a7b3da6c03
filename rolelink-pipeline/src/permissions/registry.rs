use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rolelink_repository::ConfigRepository;
use rolelink_shared::types::{GuildId, MemberContext, RoleId};
use tracing::{debug, info};

use crate::errors::PermissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Removed,
    NotPresent,
}

/// Command → allowed roles lookup with a privileged bypass.
///
/// Privilege comes from the member's own directory permissions
/// (administrator or manage roles) or from holding one of the super-admin
/// roles fixed at startup.
#[derive(Clone)]
pub struct PermissionRegistry {
    repository: Arc<dyn ConfigRepository>,
    super_admin_roles: BTreeSet<RoleId>,
}

impl PermissionRegistry {
    pub fn new(repository: Arc<dyn ConfigRepository>, super_admin_roles: BTreeSet<RoleId>) -> Self {
        Self {
            repository,
            super_admin_roles,
        }
    }

    pub fn is_privileged(&self, member: &MemberContext) -> bool {
        member.permissions.is_elevated() || !member.role_ids.is_disjoint(&self.super_admin_roles)
    }

    /// Returns whether a member holding `member_roles` may run `command`.
    ///
    /// Privileged callers always pass. Otherwise the command needs an entry in
    /// the guild that intersects `member_roles`; no entry means no access.
    pub fn check(
        &self,
        guild_id: GuildId,
        command: &str,
        member_roles: &BTreeSet<RoleId>,
        is_privileged: bool,
    ) -> bool {
        if is_privileged {
            return true;
        }
        let Ok(command) = normalize(command) else {
            return false;
        };
        let config = self.repository.snapshot();
        let allowed = config
            .allowed_roles(guild_id, &command)
            .is_some_and(|roles| roles.iter().any(|role| member_roles.contains(role)));
        debug!(guild_id = %guild_id, command = %command, allowed, "Permission checked");
        allowed
    }

    /// [`check`](Self::check) for a full member context.
    pub fn authorize(&self, member: &MemberContext, command: &str) -> bool {
        self.check(member.guild_id, command, &member.role_ids, self.is_privileged(member))
    }

    /// Allows `role_id` to run `command` in `guild_id`. Idempotent.
    pub async fn grant(
        &self,
        guild_id: GuildId,
        command: &str,
        role_id: RoleId,
    ) -> Result<GrantOutcome, PermissionError> {
        let command = normalize(command)?;
        let mut outcome = GrantOutcome::AlreadyPresent;
        self.repository
            .mutate(&mut |config| {
                let roles = config
                    .command_permissions
                    .entry(guild_id)
                    .or_default()
                    .entry(command.clone())
                    .or_default();
                if roles.contains(&role_id) {
                    outcome = GrantOutcome::AlreadyPresent;
                    return false;
                }
                roles.push(role_id);
                outcome = GrantOutcome::Added;
                true
            })
            .await?;

        if outcome == GrantOutcome::Added {
            info!(
                guild_id = %guild_id,
                command = %command,
                role_id = %role_id,
                "Command permission granted"
            );
        }
        Ok(outcome)
    }

    /// Removes `role_id` from the allow-list of `command`.
    ///
    /// Entries left without roles are deleted, and so is a guild left without
    /// entries.
    pub async fn revoke(
        &self,
        guild_id: GuildId,
        command: &str,
        role_id: RoleId,
    ) -> Result<RevokeOutcome, PermissionError> {
        let command = normalize(command)?;
        let mut outcome = RevokeOutcome::NotPresent;
        self.repository
            .mutate(&mut |config| {
                outcome = RevokeOutcome::NotPresent;
                let Some(commands) = config.command_permissions.get_mut(&guild_id) else {
                    return false;
                };
                let Some(roles) = commands.get_mut(&command) else {
                    return false;
                };
                let before = roles.len();
                roles.retain(|role| *role != role_id);
                if roles.len() == before {
                    return false;
                }
                if roles.is_empty() {
                    commands.remove(&command);
                }
                if commands.is_empty() {
                    config.command_permissions.remove(&guild_id);
                }
                outcome = RevokeOutcome::Removed;
                true
            })
            .await?;

        if outcome == RevokeOutcome::Removed {
            info!(
                guild_id = %guild_id,
                command = %command,
                role_id = %role_id,
                "Command permission revoked"
            );
        }
        Ok(outcome)
    }

    /// Every command entry of a guild, ordered by command name.
    pub fn list(&self, guild_id: GuildId) -> BTreeMap<String, Vec<RoleId>> {
        self.repository
            .snapshot()
            .command_permissions
            .get(&guild_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn normalize(command: &str) -> Result<String, PermissionError> {
    let trimmed = command.trim().trim_start_matches('/');
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(PermissionError::InvalidCommand(command.to_string()));
    }
    Ok(trimmed.to_lowercase())
}
