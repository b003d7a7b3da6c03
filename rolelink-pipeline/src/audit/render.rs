use rolelink_shared::types::{AuditAction, AuditEvent};

/// Renders an audit event as a plain text channel message.
///
/// `role_names` must line up with `event.roles`; `trigger_name` is the
/// resolved name of `event.trigger`, if any.
pub fn render_message(
    event: &AuditEvent,
    role_names: &[String],
    trigger_name: Option<&str>,
) -> String {
    let title = match event.action {
        AuditAction::AutoGrant => "Assigned automatically",
        AuditAction::AutoRevoke => "Removed automatically",
        AuditAction::ManualGrant => "Role assigned",
        AuditAction::ManualRevoke => "Role removed",
    };
    let roles = role_names.join(", ");

    let details = match (event.action, trigger_name) {
        (AuditAction::AutoGrant, Some(trigger)) => {
            format!("Role '{trigger}' granted automatically: {roles}")
        }
        (AuditAction::AutoRevoke, Some(trigger)) => {
            format!("Removal of '{trigger}' revoked: {roles}")
        }
        (AuditAction::ManualGrant, _) => "Assigned manually".to_string(),
        (AuditAction::ManualRevoke, _) => "Removed manually".to_string(),
        (_, None) => roles.clone(),
    };

    let mut lines = vec![
        format!("**{title}**"),
        format!("> Member: <@{}> (`{}`)", event.member_id, event.member_id),
        format!("> Roles: {roles}"),
    ];
    if let Some(moderator) = event.moderator {
        lines.push(format!("> Moderator: <@{moderator}>"));
    }
    lines.push(format!("```{details}```"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolelink_shared::types::{GuildId, MemberId, RoleId};

    #[test]
    fn test_render_auto_revoke() {
        let event = AuditEvent::automatic(
            GuildId(1),
            MemberId(5),
            AuditAction::AutoRevoke,
            RoleId(10),
            vec![RoleId(20)],
        );
        let message = render_message(&event, &["Verified".to_string()], Some("Members"));

        assert!(message.starts_with("**Removed automatically**"));
        assert!(message.contains("<@5>"));
        assert!(message.contains("Removal of 'Members' revoked: Verified"));
        assert!(!message.contains("Moderator"));
    }

    #[test]
    fn test_render_manual_grant_names_moderator() {
        let event = AuditEvent::manual(
            GuildId(1),
            MemberId(5),
            AuditAction::ManualGrant,
            RoleId(20),
            MemberId(6),
        );
        let message = render_message(&event, &["Verified".to_string()], None);

        assert!(message.contains("> Moderator: <@6>"));
        assert!(message.contains("Assigned manually"));
    }
}
