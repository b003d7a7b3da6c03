use std::collections::BTreeSet;

use rolelink_shared::types::{PlannedChange, PropagationPlan, RoleGraph, RoleId};
use tracing::debug;

/// Plans the child role grants and revokes caused by one role change.
///
/// `held` is the member's role set after the event. The graph is read once,
/// as a single snapshot, and only direct children of changed parents are
/// considered.
///
/// 1. Every child of an added parent that is neither held nor already queued
///    is granted.
/// 2. Every child of a removed parent that is held after the grants is revoked,
///    unless another parent that lists it is held and not itself removed.
/// 3. A role queued for grant is never revoked in the same plan.
///
/// Parents are visited in ascending id order and children in their configured
/// order, so the same input always yields the same plan.
pub fn plan(
    graph: &RoleGraph,
    added: &BTreeSet<RoleId>,
    removed: &BTreeSet<RoleId>,
    held: &BTreeSet<RoleId>,
) -> PropagationPlan {
    let mut plan = PropagationPlan::default();

    let mut queued = BTreeSet::new();
    for &parent in added {
        for &child in graph.children(parent) {
            if held.contains(&child) || !queued.insert(child) {
                continue;
            }
            plan.grants.push(PlannedChange {
                role: child,
                trigger: parent,
            });
        }
    }

    let effective: BTreeSet<RoleId> = held.union(&queued).copied().collect();
    let mut revoked = BTreeSet::new();
    for &parent in removed {
        for &child in graph.children(parent) {
            if !effective.contains(&child) || revoked.contains(&child) {
                continue;
            }

            // Only a parent the member already holds retains a child; a parent
            // that is merely queued for grant never does.
            let retained_by = graph.parents_of(child).find(|&other| {
                other != parent && held.contains(&other) && !removed.contains(&other)
            });
            if let Some(other) = retained_by {
                debug!(
                    role_id = %child,
                    removed_parent = %parent,
                    retained_by = %other,
                    "Keeping child role"
                );
                continue;
            }

            if queued.contains(&child) {
                debug!(
                    role_id = %child,
                    removed_parent = %parent,
                    "Grant and revoke overlap, grant wins"
                );
                continue;
            }

            revoked.insert(child);
            plan.revokes.push(PlannedChange {
                role: child,
                trigger: parent,
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(raw: &[u64]) -> BTreeSet<RoleId> {
        raw.iter().copied().map(RoleId).collect()
    }

    fn graph(edges: &[(u64, &[u64])]) -> RoleGraph {
        let mut graph = RoleGraph::new();
        for (parent, children) in edges {
            graph.connect(RoleId(*parent), children.iter().copied().map(RoleId));
        }
        graph
    }

    #[test]
    fn test_empty_delta_is_idempotent() {
        let graph = graph(&[(1, &[10, 11]), (2, &[11])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[]), &roles(&[1, 2, 10]));
        assert!(plan.is_empty());

        let plan = super::plan(&RoleGraph::new(), &roles(&[]), &roles(&[]), &roles(&[]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_grants_missing_children_only() {
        let graph = graph(&[(1, &[10, 11, 12])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[]), &roles(&[1, 11]));

        assert_eq!(plan.grant_ids(), roles(&[10, 12]));
        assert!(plan.revokes.is_empty());
        assert!(plan.grants.iter().all(|change| change.trigger == RoleId(1)));
    }

    #[test]
    fn test_shared_child_granted_once() {
        let graph = graph(&[(1, &[10]), (2, &[10, 11])]);
        let plan = plan(&graph, &roles(&[1, 2]), &roles(&[]), &roles(&[1, 2]));

        assert_eq!(plan.grants.len(), 2);
        assert_eq!(plan.grants[0], PlannedChange { role: RoleId(10), trigger: RoleId(1) });
        assert_eq!(plan.grants[1], PlannedChange { role: RoleId(11), trigger: RoleId(2) });
    }

    #[test]
    fn test_removing_parent_revokes_all_children() {
        // graph {P:[A,B]}, member roles {P}, removed {P}
        let graph = graph(&[(1, &[10, 11])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[1]), &roles(&[10, 11]));

        assert!(plan.grants.is_empty());
        assert_eq!(plan.revoke_ids(), roles(&[10, 11]));
    }

    #[test]
    fn test_child_retained_by_other_held_parent() {
        // graph {P1:[C], P2:[C]}, member holds {P1,P2}, removed {P1}
        let graph = graph(&[(1, &[10]), (2, &[10])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[1]), &roles(&[1, 2, 10]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_child_revoked_when_every_parent_removed() {
        let graph = graph(&[(1, &[10]), (2, &[10])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[1, 2]), &roles(&[10]));

        assert_eq!(plan.revoke_ids(), roles(&[10]));
        assert_eq!(plan.revokes.len(), 1);
        assert_eq!(plan.revokes[0].trigger, RoleId(1));
    }

    #[test]
    fn test_child_not_held_is_not_revoked() {
        let graph = graph(&[(1, &[10, 11])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[1]), &roles(&[11]));
        assert_eq!(plan.revoke_ids(), roles(&[11]));
    }

    #[test]
    fn test_grant_wins_over_revoke() {
        // C is a child of added P1 and of removed P2, nothing else retains it.
        let graph = graph(&[(1, &[10]), (2, &[10])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[2]), &roles(&[1]));

        assert_eq!(plan.grant_ids(), roles(&[10]));
        assert!(plan.revokes.is_empty());
    }

    #[test]
    fn test_grant_wins_when_snapshot_lags_behind() {
        // The snapshot does not yet show the added parent, so retention cannot
        // rescue the child; the overlap rule still keeps the grant.
        let graph = graph(&[(1, &[10]), (2, &[10])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[2]), &roles(&[]));

        assert_eq!(plan.grant_ids(), roles(&[10]));
        assert!(plan.revokes.is_empty());
    }

    #[test]
    fn test_grant_wins_when_child_already_held() {
        // Held child of both an added and a removed parent: retained through
        // the added parent, so neither list mentions it.
        let graph = graph(&[(1, &[10]), (2, &[10])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[2]), &roles(&[1, 10]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_single_level_cascade() {
        // {G:[P], P:[C]}: gaining G grants P only; C is never reached.
        let graph = graph(&[(1, &[2]), (2, &[3])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[]), &roles(&[1]));

        assert_eq!(plan.grant_ids(), roles(&[2]));
        assert!(!plan.grant_ids().contains(&RoleId(3)));
    }

    #[test]
    fn test_queued_parent_does_not_retain_child() {
        // {1:[2], 2:[3], 9:[3]}: gaining 1 queues 2, losing 9 must still revoke
        // 3, because 2 is not held yet and 3 is two hops away from 1.
        let graph = graph(&[(1, &[2]), (2, &[3]), (9, &[3])]);
        let plan = plan(&graph, &roles(&[1]), &roles(&[9]), &roles(&[1, 3]));

        assert_eq!(plan.grant_ids(), roles(&[2]));
        assert_eq!(plan.revoke_ids(), roles(&[3]));
        assert_eq!(plan.revokes[0].trigger, RoleId(9));
    }

    #[test]
    fn test_single_level_revoke() {
        // Losing G revokes P but leaves P's own children alone.
        let graph = graph(&[(1, &[2]), (2, &[3])]);
        let plan = plan(&graph, &roles(&[]), &roles(&[1]), &roles(&[2, 3]));
        assert_eq!(plan.revoke_ids(), roles(&[2]));
    }

    #[test]
    fn test_removed_parent_not_in_graph_is_ignored() {
        let graph = graph(&[(1, &[10])]);
        let plan = plan(&graph, &roles(&[7]), &roles(&[8]), &roles(&[7, 10]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let graph = graph(&[(3, &[30, 31]), (1, &[10]), (2, &[20, 10])]);
        let first = plan(&graph, &roles(&[3, 1, 2]), &roles(&[]), &roles(&[1, 2, 3]));
        let second = plan(&graph, &roles(&[2, 3, 1]), &roles(&[]), &roles(&[3, 2, 1]));

        assert_eq!(first, second);
        let order: Vec<RoleId> = first.grants.iter().map(|change| change.role).collect();
        assert_eq!(order, vec![RoleId(10), RoleId(20), RoleId(30), RoleId(31)]);
    }
}
