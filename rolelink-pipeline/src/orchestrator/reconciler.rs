use std::sync::atomic::{AtomicU64, Ordering};

use rolelink_shared::types::RoleChangeEvent;
use tracing::{debug, info, instrument};

use crate::consumer::diff_roles;
use crate::loader::{AppliedResult, MutationApplier};
use crate::processor::plan;
use crate::store::RoleGraphStore;

/// Running totals across every reconciled event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub events: u64,
    pub granted: u64,
    pub revoked: u64,
    pub failed: u64,
}

/// Runs one role change event through intake, planning and application.
pub struct Reconciler {
    graphs: RoleGraphStore,
    applier: MutationApplier,
    events: AtomicU64,
    granted: AtomicU64,
    revoked: AtomicU64,
    failed: AtomicU64,
}

impl Reconciler {
    pub fn new(graphs: RoleGraphStore, applier: MutationApplier) -> Self {
        Self {
            graphs,
            applier,
            events: AtomicU64::new(0),
            granted: AtomicU64::new(0),
            revoked: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Reconciles a member against one observed role change.
    ///
    /// The guild's graph is read once, as a snapshot, before planning.
    ///
    /// # Returns
    ///
    /// `None` when the event leads to no directory call at all, either because
    /// the snapshots are identical or because no changed role is a parent.
    #[instrument(
        skip(self, event),
        fields(guild_id = %event.guild_id, member_id = %event.member_id)
    )]
    pub async fn reconcile(&self, event: &RoleChangeEvent) -> Option<AppliedResult> {
        self.events.fetch_add(1, Ordering::Relaxed);

        let delta = diff_roles(event);
        if delta.is_empty() {
            debug!("Role snapshots are identical");
            return None;
        }

        let graph = self.graphs.snapshot(event.guild_id);
        let plan = plan(&graph, &delta.added, &delta.removed, &event.roles_after);
        if plan.is_empty() {
            debug!(
                added = delta.added.len(),
                removed = delta.removed.len(),
                "Nothing to propagate"
            );
            return None;
        }

        let result = self
            .applier
            .apply(&plan, event.guild_id, event.member_id)
            .await;

        self.granted.fetch_add(result.granted.len() as u64, Ordering::Relaxed);
        self.revoked.fetch_add(result.revoked.len() as u64, Ordering::Relaxed);
        self.failed.fetch_add(result.errors.len() as u64, Ordering::Relaxed);
        info!(
            granted = result.granted.len(),
            revoked = result.revoked.len(),
            failed = result.errors.len(),
            "Member reconciled"
        );
        Some(result)
    }

    pub fn stats(&self) -> ReconcileStats {
        ReconcileStats {
            events: self.events.load(Ordering::Relaxed),
            granted: self.granted.load(Ordering::Relaxed),
            revoked: self.revoked.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
