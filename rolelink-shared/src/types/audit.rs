use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GuildId, MemberId, RoleId};

/// Kind of role mutation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Child roles granted because a parent role was added.
    AutoGrant,
    /// Child roles revoked because their last held parent was removed.
    AutoRevoke,
    /// Role granted by a moderator command.
    ManualGrant,
    /// Role revoked by a moderator command.
    ManualRevoke,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AutoGrant => "auto_grant",
            AuditAction::AutoRevoke => "auto_revoke",
            AuditAction::ManualGrant => "manual_grant",
            AuditAction::ManualRevoke => "manual_revoke",
        }
    }

    pub fn is_grant(&self) -> bool {
        matches!(self, AuditAction::AutoGrant | AuditAction::ManualGrant)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit record per applied batch of role changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub guild_id: GuildId,
    pub member_id: MemberId,
    pub action: AuditAction,
    /// Parent role whose change caused the batch. `None` for manual actions.
    pub trigger: Option<RoleId>,
    pub roles: Vec<RoleId>,
    /// Member who ran the command, for manual actions.
    pub moderator: Option<MemberId>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn automatic(
        guild_id: GuildId,
        member_id: MemberId,
        action: AuditAction,
        trigger: RoleId,
        roles: Vec<RoleId>,
    ) -> Self {
        Self {
            guild_id,
            member_id,
            action,
            trigger: Some(trigger),
            roles,
            moderator: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn manual(
        guild_id: GuildId,
        member_id: MemberId,
        action: AuditAction,
        role: RoleId,
        moderator: MemberId,
    ) -> Self {
        Self {
            guild_id,
            member_id,
            action,
            trigger: None,
            roles: vec![role],
            moderator: Some(moderator),
            occurred_at: Utc::now(),
        }
    }
}
