use async_trait::async_trait;
use rolelink_shared::types::AuditEvent;
use tracing::info;

use crate::audit::AuditSink;
use crate::errors::AuditError;

/// Writes audit events to the `rolelink::audit` tracing target.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn publish(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let roles = serde_json::to_string(&event.roles)?;
        info!(
            target: "rolelink::audit",
            guild_id = %event.guild_id,
            member_id = %event.member_id,
            action = %event.action,
            trigger = ?event.trigger.map(|role| role.get()),
            moderator = ?event.moderator.map(|member| member.get()),
            roles = %roles,
            occurred_at = %event.occurred_at.to_rfc3339(),
            "Audit event"
        );
        Ok(())
    }
}
