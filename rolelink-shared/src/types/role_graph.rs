use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::RoleId;

type Edges = BTreeMap<RoleId, Vec<RoleId>>;

/// Parent → children adjacency for a single guild.
///
/// Each parent maps to an ordered list of unique child roles. A role may be
/// the child of several parents. Only direct children are ever looked up;
/// the graph is never walked transitively.
///
/// Deserialization goes through [`RoleGraph::from`] so duplicate children in a
/// hand-edited file are collapsed on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Edges", into = "Edges")]
pub struct RoleGraph {
    edges: Edges,
}

impl RoleGraph {
    pub const fn new() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }

    /// Replaces the children of `parent` wholesale.
    ///
    /// Duplicates are dropped, keeping the first occurrence, and the stored
    /// child list is returned.
    pub fn connect<I>(&mut self, parent: RoleId, children: I) -> &[RoleId]
    where
        I: IntoIterator<Item = RoleId>,
    {
        let children = dedup_preserving_order(children);
        let slot = self.edges.entry(parent).or_default();
        *slot = children;
        slot.as_slice()
    }

    /// Removes every edge of `parent`, returning the previous children.
    pub fn disconnect(&mut self, parent: RoleId) -> Option<Vec<RoleId>> {
        self.edges.remove(&parent)
    }

    /// Direct children of `parent`, empty when the role is not a parent.
    pub fn children(&self, parent: RoleId) -> &[RoleId] {
        self.edges.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_parent(&self, role: RoleId) -> bool {
        self.edges.contains_key(&role)
    }

    /// Every parent that lists `child` among its direct children.
    pub fn parents_of(&self, child: RoleId) -> impl Iterator<Item = RoleId> + '_ {
        self.edges
            .iter()
            .filter(move |(_, children)| children.contains(&child))
            .map(|(parent, _)| *parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoleId, &[RoleId])> + '_ {
        self.edges
            .iter()
            .map(|(parent, children)| (*parent, children.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl From<Edges> for RoleGraph {
    fn from(edges: Edges) -> Self {
        let edges = edges
            .into_iter()
            .map(|(parent, children)| (parent, dedup_preserving_order(children)))
            .collect();
        Self { edges }
    }
}

impl From<RoleGraph> for Edges {
    fn from(graph: RoleGraph) -> Self {
        graph.edges
    }
}

fn dedup_preserving_order<I>(roles: I) -> Vec<RoleId>
where
    I: IntoIterator<Item = RoleId>,
{
    let mut seen = BTreeSet::new();
    roles.into_iter().filter(|role| seen.insert(*role)).collect()
}
