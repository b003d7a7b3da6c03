use std::collections::BTreeSet;

use crate::types::{AuditAction, RoleId};

/// A single role to grant or revoke, with the parent role that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlannedChange {
    pub role: RoleId,
    pub trigger: RoleId,
}

/// Grants and revokes computed for one role change event.
///
/// A role never appears in both lists. Changes keep the order in which the
/// planner produced them so that application and audit output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationPlan {
    pub grants: Vec<PlannedChange>,
    pub revokes: Vec<PlannedChange>,
}

/// Changes sharing the same action kind and triggering role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanBatch {
    pub action: AuditAction,
    pub trigger: RoleId,
    pub roles: Vec<RoleId>,
}

impl PropagationPlan {
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.revokes.is_empty()
    }

    pub fn grant_ids(&self) -> BTreeSet<RoleId> {
        self.grants.iter().map(|change| change.role).collect()
    }

    pub fn revoke_ids(&self) -> BTreeSet<RoleId> {
        self.revokes.iter().map(|change| change.role).collect()
    }

    /// Groups the plan into batches: grants first, then revokes, each group in
    /// order of the trigger's first appearance.
    pub fn batches(&self) -> Vec<PlanBatch> {
        let mut batches = Vec::new();
        group_into(&mut batches, AuditAction::AutoGrant, &self.grants);
        group_into(&mut batches, AuditAction::AutoRevoke, &self.revokes);
        batches
    }
}

fn group_into(batches: &mut Vec<PlanBatch>, action: AuditAction, changes: &[PlannedChange]) {
    let start = batches.len();
    for change in changes {
        match batches[start..]
            .iter_mut()
            .find(|batch| batch.trigger == change.trigger)
        {
            Some(batch) => batch.roles.push(change.role),
            None => batches.push(PlanBatch {
                action,
                trigger: change.trigger,
                roles: vec![change.role],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(role: u64, trigger: u64) -> PlannedChange {
        PlannedChange {
            role: RoleId(role),
            trigger: RoleId(trigger),
        }
    }

    #[test]
    fn test_batches_group_by_trigger() {
        let plan = PropagationPlan {
            grants: vec![change(1, 10), change(2, 20), change(3, 10)],
            revokes: vec![change(4, 30)],
        };

        let batches = plan.batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].action, AuditAction::AutoGrant);
        assert_eq!(batches[0].trigger, RoleId(10));
        assert_eq!(batches[0].roles, vec![RoleId(1), RoleId(3)]);
        assert_eq!(batches[1].trigger, RoleId(20));
        assert_eq!(batches[2].action, AuditAction::AutoRevoke);
        assert_eq!(batches[2].roles, vec![RoleId(4)]);
    }

    #[test]
    fn test_same_trigger_in_grant_and_revoke_stays_separate() {
        let plan = PropagationPlan {
            grants: vec![change(1, 10)],
            revokes: vec![change(2, 10)],
        };
        let batches = plan.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].action, AuditAction::AutoRevoke);
    }

    #[test]
    fn test_empty_plan_has_no_batches() {
        let plan = PropagationPlan::default();
        assert!(plan.is_empty());
        assert!(plan.batches().is_empty());
    }
}
