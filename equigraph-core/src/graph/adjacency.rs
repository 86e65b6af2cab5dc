//! Derived neighbour lists.

use std::collections::BTreeMap;

use super::{Graph, NodeId};

/// Neighbour lists derived from a [`Graph`].
///
/// Every node of the graph has an entry, including isolated ones. Neighbours
/// appear in the order their edges were inserted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Adjacency {
    lists: BTreeMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    pub(super) fn from_graph(graph: &Graph) -> Self {
        let mut lists: BTreeMap<NodeId, Vec<NodeId>> =
            graph.nodes().map(|id| (id, Vec::new())).collect();
        for edge in graph.edges() {
            if let Some(list) = lists.get_mut(&edge.a()) {
                list.push(edge.b());
            }
            if let Some(list) = lists.get_mut(&edge.b()) {
                list.push(edge.a());
            }
        }
        Self { lists }
    }

    /// Returns the neighbours of `id`, or an empty slice for unknown ids.
    #[must_use]
    pub fn neighbours(&self, id: NodeId) -> &[NodeId] {
        self.lists.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` when `id` has at least one neighbour in `targets`.
    pub fn touches_any(&self, id: NodeId, mut targets: impl FnMut(NodeId) -> bool) -> bool {
        self.neighbours(id).iter().any(|&neighbour| targets(neighbour))
    }

    /// Returns the degree of `id`.
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbours(id).len()
    }

    /// Returns the largest degree, or zero when there are no nodes.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.lists.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Iterates `(node, neighbours)` in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> {
        self.lists.iter().map(|(id, list)| (*id, list.as_slice()))
    }
}
