//! Auxiliary "movability" digraph over color classes.
//!
//! Edge `i -> j` exists when some member of class `i` has no neighbour in
//! class `j`, so it could move into `j` without creating a conflict. The
//! digraph is rebuilt from scratch for every query.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, instrument};

use super::{ClassIndex, Coloring};
use crate::graph::{Graph, NodeId};

/// Visual role of a class within the digraph.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum ClassRole {
    /// The lowest-index class of maximum size.
    Large,
    /// The lowest-index class of minimum size.
    Small,
    /// Any other class, or every class when all sizes agree.
    Normal,
}

/// Class node of the auxiliary digraph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassNode {
    /// The class.
    pub class: ClassIndex,
    /// Number of members.
    pub size: usize,
    /// Annotated role.
    pub role: ClassRole,
}

/// Directed edge `from -> to` justified by `witness`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuxEdge {
    /// Donating class.
    pub from: ClassIndex,
    /// Receiving class.
    pub to: ClassIndex,
    /// Lowest-id member of `from` with no neighbour in `to`.
    pub witness: NodeId,
}

/// Class-level movability digraph.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuxDigraph {
    nodes: Vec<ClassNode>,
    edges: Vec<AuxEdge>,
}

impl AuxDigraph {
    /// Returns one node per class, in class order.
    #[must_use]
    #[rustfmt::skip]
    pub fn nodes(&self) -> &[ClassNode] { &self.nodes }

    /// Returns the edges ordered by `(from, to)`.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[AuxEdge] { &self.edges }

    /// Returns the edge `from -> to`, when present.
    #[must_use]
    pub fn edge(&self, from: ClassIndex, to: ClassIndex) -> Option<&AuxEdge> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }

    /// Returns `true` when `from -> to` is an edge.
    #[must_use]
    pub fn has_edge(&self, from: ClassIndex, to: ClassIndex) -> bool {
        self.edge(from, to).is_some()
    }

    /// Iterates the successors of `class` in ascending order.
    pub fn successors(&self, class: ClassIndex) -> impl Iterator<Item = ClassIndex> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.from == class)
            .map(|edge| edge.to)
    }

    /// Returns the class annotated with `role`, if any.
    #[must_use]
    pub fn class_with_role(&self, role: ClassRole) -> Option<ClassIndex> {
        self.nodes
            .iter()
            .find(|node| node.role == role)
            .map(|node| node.class)
    }

    /// Finds a shortest class path `from -> ... -> to`, exploring successors
    /// in ascending class order. The path includes both ends.
    #[must_use]
    pub fn shortest_path(&self, from: ClassIndex, to: ClassIndex) -> Option<Vec<ClassIndex>> {
        let classes = self.nodes.len();
        if from.get() >= classes || to.get() >= classes {
            return None;
        }
        let mut parent: Vec<Option<ClassIndex>> = vec![None; classes];
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(class) = queue.pop_front() {
            if class == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(previous) = parent.get(cursor.get()).copied().flatten() {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.successors(class) {
                if seen.insert(next) {
                    if let Some(slot) = parent.get_mut(next.get()) {
                        *slot = Some(class);
                    }
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

fn annotate_roles(counts: &[usize]) -> Vec<ClassRole> {
    let mut roles = vec![ClassRole::Normal; counts.len()];
    let (Some(&max), Some(&min)) = (counts.iter().max(), counts.iter().min()) else {
        return roles;
    };
    if max == min {
        return roles;
    }
    let large = counts.iter().position(|&size| size == max);
    let small = counts.iter().position(|&size| size == min);
    if let Some(role) = large.and_then(|index| roles.get_mut(index)) {
        *role = ClassRole::Large;
    }
    if let Some(role) = small.and_then(|index| roles.get_mut(index)) {
        *role = ClassRole::Small;
    }
    roles
}

/// Builds the auxiliary digraph for `coloring` over `graph`.
///
/// Nodes without a class are ignored.
///
/// # Examples
/// ```
/// use equigraph_core::{ClassIndex, ClassRole, Graph, NodeId, build_aux, seed_coloring};
///
/// let mut graph = Graph::new();
/// let ids = graph.add_nodes(3)?;
/// graph.add_edge(ids[0], ids[1])?;
/// let aux = build_aux(&graph, &seed_coloring(&graph, 2));
/// // Class 0 = {1, 3}; node 3 has no neighbour in class 1.
/// let edge = aux.edge(ClassIndex::new(0), ClassIndex::new(1)).expect("movable");
/// assert_eq!(edge.witness, NodeId::new(3));
/// assert_eq!(aux.class_with_role(ClassRole::Large), Some(ClassIndex::new(0)));
/// # Ok::<(), equigraph_core::GraphError>(())
/// ```
#[must_use]
#[instrument(
    name = "coloring.aux",
    skip(graph, coloring),
    fields(classes = coloring.classes(), nodes = graph.node_count()),
)]
pub fn build_aux(graph: &Graph, coloring: &Coloring) -> AuxDigraph {
    let classes = coloring.classes();
    let counts = coloring.class_counts();
    let adjacency = graph.adjacency();

    // For each colored node, the set of classes among its neighbours.
    let mut blocked: Vec<(NodeId, ClassIndex, BTreeSet<ClassIndex>)> = Vec::new();
    for (node, class) in coloring.iter() {
        if !graph.contains_node(node) {
            continue;
        }
        let seen = adjacency
            .neighbours(node)
            .iter()
            .filter_map(|neighbour| coloring.class_of(*neighbour))
            .collect();
        blocked.push((node, class, seen));
    }

    let mut edges = Vec::new();
    for from in (0..classes).map(ClassIndex::new) {
        for to in (0..classes).map(ClassIndex::new) {
            if from == to {
                continue;
            }
            let witness = blocked
                .iter()
                .find(|(_, class, seen)| *class == from && !seen.contains(&to))
                .map(|(node, _, _)| *node);
            if let Some(witness) = witness {
                edges.push(AuxEdge { from, to, witness });
            }
        }
    }

    let nodes = annotate_roles(&counts)
        .into_iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (role, size))| ClassNode {
            class: ClassIndex::new(index),
            size,
            role,
        })
        .collect();
    debug!(edges = edges.len(), "auxiliary digraph built");
    AuxDigraph { nodes, edges }
}
