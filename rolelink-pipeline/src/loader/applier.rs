use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rolelink_shared::types::{
    AuditAction, AuditEvent, GuildId, MemberId, PropagationPlan, RoleId,
};
use serde::Serialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, instrument, warn};

use crate::audit::AuditLogger;
use crate::directory::Directory;
use crate::errors::{DirectoryError, ExternalErrorKind};

const GRANT_REASON: &str = "Linked roles added automatically";
const REVOKE_REASON: &str = "Linked roles removed automatically";

/// How transient directory failures are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: usize,
    /// Delay before each retry.
    pub delay: Duration,
    /// Upper bound for a delay stretched by a rate limit hint.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before a retry, given the directory's `retry_after` hint.
    ///
    /// The hint only ever lengthens the configured delay, and never past
    /// `max_delay`.
    pub fn delay_for(&self, retry_after: Duration) -> Duration {
        let cap = self.max_delay.max(self.delay);
        self.delay.max(retry_after).min(cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// A role that could not be granted or revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleFailure {
    pub role: RoleId,
    pub action: AuditAction,
    pub kind: ExternalErrorKind,
    pub message: String,
}

/// Outcome of applying one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedResult {
    pub granted: Vec<RoleId>,
    pub revoked: Vec<RoleId>,
    pub errors: Vec<RoleFailure>,
    /// Audit events emitted for this plan, one per applied batch.
    pub audit_events: Vec<AuditEvent>,
}

impl AppliedResult {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// `MutationApplier` executes plans against the directory and records the
/// applied batches in the audit log.
pub struct MutationApplier {
    directory: Arc<dyn Directory>,
    audit: AuditLogger,
    retry: RetryPolicy,
}

impl MutationApplier {
    pub fn new(directory: Arc<dyn Directory>, audit: AuditLogger) -> Self {
        Self {
            directory,
            audit,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Applies `plan` to a member.
    ///
    /// Batches are applied in plan order (grants before revokes). Each batch
    /// that has at least one successful change emits exactly one audit event
    /// listing the roles that were actually changed.
    ///
    /// # Arguments
    ///
    /// * `plan` - The plan computed for the member's latest role change
    /// * `guild_id` - Guild the member belongs to
    /// * `member_id` - Member to mutate
    ///
    /// # Returns
    ///
    /// An `AppliedResult` listing successes and per-role failures. This method
    /// never fails as a whole.
    #[instrument(
        skip(self, plan),
        fields(grants = plan.grants.len(), revokes = plan.revokes.len())
    )]
    pub async fn apply(
        &self,
        plan: &PropagationPlan,
        guild_id: GuildId,
        member_id: MemberId,
    ) -> AppliedResult {
        let mut result = AppliedResult::default();

        for batch in plan.batches() {
            let mut applied = Vec::with_capacity(batch.roles.len());
            for &role_id in &batch.roles {
                match self.apply_role(batch.action, guild_id, member_id, role_id).await {
                    Ok(()) => applied.push(role_id),
                    Err(e) => {
                        warn!(
                            role_id = %role_id,
                            action = %batch.action,
                            error = %e,
                            "Failed to apply role change"
                        );
                        result.errors.push(RoleFailure {
                            role: role_id,
                            action: batch.action,
                            kind: e.kind(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            if applied.is_empty() {
                continue;
            }

            if batch.action.is_grant() {
                result.granted.extend_from_slice(&applied);
            } else {
                result.revoked.extend_from_slice(&applied);
            }

            let event =
                AuditEvent::automatic(guild_id, member_id, batch.action, batch.trigger, applied);
            self.audit.record(&event).await;
            result.audit_events.push(event);
        }

        debug!(
            granted = result.granted.len(),
            revoked = result.revoked.len(),
            failed = result.errors.len(),
            "Plan applied"
        );
        result
    }

    /// One directory call for one role, retried while the error is transient.
    ///
    /// The strategy is polled only after a failure has been classified, so a
    /// `RateLimited` hint recorded by the condition applies to that retry.
    async fn apply_role(
        &self,
        action: AuditAction,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
    ) -> Result<(), DirectoryError> {
        let retry_after_ms = AtomicU64::new(0);
        let policy = self.retry;
        let strategy = FixedInterval::new(policy.delay)
            .take(policy.max_retries)
            .map(|_| {
                let hint = Duration::from_millis(retry_after_ms.swap(0, Ordering::Relaxed));
                policy.delay_for(hint)
            });
        let directory = &self.directory;

        RetryIf::spawn(
            strategy,
            || async move {
                if action.is_grant() {
                    directory.add_role(guild_id, member_id, role_id, GRANT_REASON).await
                } else {
                    directory.remove_role(guild_id, member_id, role_id, REVOKE_REASON).await
                }
            },
            |e: &DirectoryError| {
                if let DirectoryError::RateLimited { retry_after_ms: hint } = e {
                    retry_after_ms.store(*hint, Ordering::Relaxed);
                }
                let retry = e.is_transient();
                if retry {
                    debug!(role_id = %role_id, error = %e, "Retrying transient failure");
                }
                retry
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::directory::{DirectoryCall, MockDirectory};
    use rolelink_shared::types::PlannedChange;

    const GUILD: GuildId = GuildId(1);
    const MEMBER: MemberId = MemberId(5);

    fn change(role: u64, trigger: u64) -> PlannedChange {
        PlannedChange {
            role: RoleId(role),
            trigger: RoleId(trigger),
        }
    }

    fn setup() -> (Arc<MockDirectory>, Arc<MemoryAuditSink>, MutationApplier) {
        let directory = Arc::new(MockDirectory::new());
        for role in [10, 11, 12, 20] {
            directory.register_role(GUILD, RoleId(role), "role");
        }
        let sink = Arc::new(MemoryAuditSink::new());
        let audit = AuditLogger::new().with_sink(sink.clone());
        let applier = MutationApplier::new(directory.clone(), audit).with_retry_policy(RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(1),
            max_delay: Duration::from_secs(1),
        });
        (directory, sink, applier)
    }

    fn grant_plan(roles: &[u64]) -> PropagationPlan {
        PropagationPlan {
            grants: roles.iter().map(|&role| change(role, 1)).collect(),
            revokes: vec![],
        }
    }

    #[test]
    fn test_delay_for_stretches_to_hint_within_cap() {
        let policy = RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        };

        assert_eq!(policy.delay_for(Duration::ZERO), Duration::from_millis(100));
        assert_eq!(policy.delay_for(Duration::from_millis(20)), Duration::from_millis(100));
        assert_eq!(policy.delay_for(Duration::from_millis(750)), Duration::from_millis(750));
        assert_eq!(policy.delay_for(Duration::from_secs(60)), Duration::from_secs(2));
    }

    #[test]
    fn test_delay_for_never_shortens_configured_delay() {
        let policy = RetryPolicy {
            max_retries: 1,
            delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(1),
        };

        assert_eq!(policy.delay_for(Duration::from_secs(10)), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_retry_waits_for_retry_after() {
        let (directory, _sink, applier) = setup();
        directory.fail_next(RoleId(10), DirectoryError::RateLimited { retry_after_ms: 200 });

        let started = tokio::time::Instant::now();
        let result = applier.apply(&grant_plan(&[10]), GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10)]);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_retry_is_capped() {
        let (directory, _sink, applier) = setup();
        let applier = applier.with_retry_policy(RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(300),
        });
        directory.fail_next(RoleId(10), DirectoryError::RateLimited { retry_after_ms: 60_000 });

        let started = tokio::time::Instant::now();
        let result = applier.apply(&grant_plan(&[10]), GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10)]);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_role_deleted_before_apply_fails_alone() {
        let (directory, sink, applier) = setup();
        let plan = grant_plan(&[10, 11, 12]);

        directory.delete_role(GUILD, RoleId(11));
        let result = applier.apply(&plan, GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10), RoleId(12)]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].role, RoleId(11));
        assert_eq!(result.errors[0].kind, ExternalErrorKind::NotFound);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].roles, vec![RoleId(10), RoleId(12)]);
        assert_eq!(
            directory.member_roles(GUILD, MEMBER),
            [RoleId(10), RoleId(12)].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_one_audit_event_per_batch() {
        let (directory, sink, applier) = setup();
        directory.set_member_roles(GUILD, MEMBER, &[RoleId(20)]);
        let plan = PropagationPlan {
            grants: vec![change(10, 1), change(11, 1)],
            revokes: vec![change(20, 2)],
        };

        let result = applier.apply(&plan, GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10), RoleId(11)]);
        assert_eq!(result.revoked, vec![RoleId(20)]);
        assert!(result.errors.is_empty());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::AutoGrant);
        assert_eq!(events[0].trigger, Some(RoleId(1)));
        assert_eq!(events[0].roles, vec![RoleId(10), RoleId(11)]);
        assert_eq!(events[1].action, AuditAction::AutoRevoke);
        assert_eq!(events[1].roles, vec![RoleId(20)]);
        assert_eq!(result.audit_events, events);

        assert_eq!(
            directory.member_roles(GUILD, MEMBER),
            [RoleId(10), RoleId(11)].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_once() {
        let (directory, _sink, applier) = setup();
        directory.fail_next(RoleId(10), DirectoryError::RateLimited { retry_after_ms: 1 });

        let plan = PropagationPlan {
            grants: vec![change(10, 1)],
            revokes: vec![],
        };
        let result = applier.apply(&plan, GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10)]);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_gives_up_after_one_retry() {
        let (directory, sink, applier) = setup();
        directory.fail_next(RoleId(10), DirectoryError::Timeout);
        directory.fail_next(RoleId(10), DirectoryError::Timeout);
        directory.fail_next(RoleId(10), DirectoryError::Timeout);

        let plan = PropagationPlan {
            grants: vec![change(10, 1)],
            revokes: vec![],
        };
        let result = applier.apply(&plan, GUILD, MEMBER).await;

        assert!(result.granted.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ExternalErrorKind::Transient);
        assert!(sink.events().is_empty());

        // Third scripted failure is still queued: exactly two attempts were made.
        let third = directory.add_role(GUILD, MEMBER, RoleId(10), "check").await;
        assert_eq!(third, Err(DirectoryError::Timeout));
    }

    #[tokio::test]
    async fn test_permanent_failure_skips_only_that_role() {
        let (directory, sink, applier) = setup();
        directory.fail_next(RoleId(11), DirectoryError::PermissionDenied("hierarchy".into()));
        directory.fail_next(RoleId(11), DirectoryError::PermissionDenied("hierarchy".into()));

        let plan = PropagationPlan {
            grants: vec![change(10, 1), change(11, 1), change(99, 1)],
            revokes: vec![],
        };
        let result = applier.apply(&plan, GUILD, MEMBER).await;

        assert_eq!(result.granted, vec![RoleId(10)]);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].role, RoleId(11));
        assert_eq!(result.errors[0].kind, ExternalErrorKind::Permission);
        assert_eq!(result.errors[1].role, RoleId(99));
        assert_eq!(result.errors[1].kind, ExternalErrorKind::NotFound);
        assert!(result.is_partial());

        // Not retried: the second scripted failure is still queued.
        let queued = directory.add_role(GUILD, MEMBER, RoleId(11), "check").await;
        assert!(matches!(queued, Err(DirectoryError::PermissionDenied(_))));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].roles, vec![RoleId(10)]);
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_calls() {
        let (directory, sink, applier) = setup();
        let result = applier.apply(&PropagationPlan::default(), GUILD, MEMBER).await;

        assert_eq!(result, AppliedResult::default());
        assert!(directory.calls().is_empty());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_calls_remove_role() {
        let (directory, _sink, applier) = setup();
        directory.set_member_roles(GUILD, MEMBER, &[RoleId(12)]);
        let plan = PropagationPlan {
            grants: vec![],
            revokes: vec![change(12, 3)],
        };
        applier.apply(&plan, GUILD, MEMBER).await;

        assert_eq!(
            directory.calls(),
            vec![DirectoryCall::RemoveRole {
                guild_id: GUILD,
                member_id: MEMBER,
                role_id: RoleId(12),
            }]
        );
    }
}
