//! Degree-bounded coloring state and class statistics.
//!
//! A [`Coloring`] maps node ids to classes `0..k`. Colorings are plain values:
//! nothing here mutates a graph, and derived statistics are recomputed on
//! every call.

mod digraph;
mod repair;

use std::{collections::BTreeMap, fmt};

use thiserror::Error;

use crate::{
    error::define_error_codes,
    graph::{Edge, Graph, NodeId},
};

pub use self::{
    digraph::{AuxDigraph, AuxEdge, ClassNode, ClassRole, build_aux},
    repair::{
        ClassMove, PathReplay, RepairOutcome, RepairRun, RepairStep, RunTermination,
        apply_repair_step, repair_until_equitable, replay_class_path,
    },
};

/// Index of a color class, valid in `0..k`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ClassIndex(usize);

impl ClassIndex {
    /// Wraps a raw class index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new(index: usize) -> Self { Self(index) }

    /// Returns the raw class index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn get(self) -> usize { self.0 }
}

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by coloring and repair operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ColoringError {
    /// The operation needs more classes.
    #[error("at least {required} classes are required (got {classes})")]
    TooFewClasses {
        /// Classes available.
        classes: usize,
        /// Minimum number of classes.
        required: usize,
    },
    /// The graph has no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,
    /// A class index is not below `k`.
    #[error("class {class} for node {node} is out of range for {classes} classes")]
    ClassOutOfRange {
        /// Node being assigned.
        node: NodeId,
        /// Rejected class.
        class: ClassIndex,
        /// Number of classes.
        classes: usize,
    },
    /// A graph node has no class.
    #[error("node {node} has no class assigned")]
    UnassignedNode {
        /// The uncolored node.
        node: NodeId,
    },
    /// The coloring assigns a class to a node the graph does not contain.
    #[error("coloring assigns a class to unknown node {node}")]
    UnknownNode {
        /// The stray node.
        node: NodeId,
    },
    /// Greedy coloring found every class blocked by neighbours.
    #[error("node {node} conflicts with all {classes} classes")]
    NoFreeClass {
        /// The node that could not be colored.
        node: NodeId,
        /// Number of classes tried.
        classes: usize,
    },
    /// Two colorings disagree on the number of classes.
    #[error("coloring has {got} classes but {expected} were expected")]
    ClassCountMismatch {
        /// Classes required by the caller.
        expected: usize,
        /// Classes in the supplied coloring.
        got: usize,
    },
    /// A class path is too short, leaves the class range or revisits a class.
    #[error("class path is invalid at position {position}")]
    InvalidClassPath {
        /// Index of the first offending entry.
        position: usize,
    },
    /// A committed repair changed class sizes other than by the expected
    /// single transfer.
    #[error("class {class} changed from {before} to {after} members during repair")]
    InvariantViolation {
        /// Class whose size is wrong.
        class: ClassIndex,
        /// Size before the repair.
        before: usize,
        /// Size after the repair.
        after: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ColoringError`] variants.
    enum ColoringErrorCode for ColoringError {
        /// The operation needs more classes.
        TooFewClasses => TooFewClasses { .. } => "COLORING_TOO_FEW_CLASSES",
        /// The graph has no nodes.
        EmptyGraph => EmptyGraph => "COLORING_EMPTY_GRAPH",
        /// A class index is not below `k`.
        ClassOutOfRange => ClassOutOfRange { .. } => "COLORING_CLASS_OUT_OF_RANGE",
        /// A graph node has no class.
        UnassignedNode => UnassignedNode { .. } => "COLORING_UNASSIGNED_NODE",
        /// The coloring names an unknown node.
        UnknownNode => UnknownNode { .. } => "COLORING_UNKNOWN_NODE",
        /// Greedy coloring ran out of classes.
        NoFreeClass => NoFreeClass { .. } => "COLORING_NO_FREE_CLASS",
        /// Class counts disagree.
        ClassCountMismatch => ClassCountMismatch { .. } => "COLORING_CLASS_COUNT_MISMATCH",
        /// A class path is malformed.
        InvalidClassPath => InvalidClassPath { .. } => "COLORING_INVALID_CLASS_PATH",
        /// A repair broke the net-size invariant.
        InvariantViolation => InvariantViolation { .. } => "COLORING_INVARIANT_VIOLATION",
    }
}

/// Assignment of nodes to `k` classes.
///
/// # Examples
/// ```
/// use equigraph_core::{ClassIndex, Coloring, NodeId};
///
/// let coloring = Coloring::from_assignments(
///     3,
///     [(NodeId::new(1), ClassIndex::new(0)), (NodeId::new(2), ClassIndex::new(2))],
/// )?;
/// assert_eq!(coloring.class_counts(), vec![1, 0, 1]);
/// assert!(coloring.is_equitable());
/// # Ok::<(), equigraph_core::ColoringError>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coloring {
    classes: usize,
    assignment: BTreeMap<NodeId, ClassIndex>,
}

impl Coloring {
    /// Creates an empty coloring over `classes` classes.
    #[must_use]
    pub fn new(classes: usize) -> Self {
        Self {
            classes,
            assignment: BTreeMap::new(),
        }
    }

    /// Builds a coloring from `(node, class)` pairs; later pairs win.
    ///
    /// # Errors
    /// Returns [`ColoringError::ClassOutOfRange`] for classes `>= classes`.
    pub fn from_assignments(
        classes: usize,
        pairs: impl IntoIterator<Item = (NodeId, ClassIndex)>,
    ) -> Result<Self, ColoringError> {
        let mut coloring = Self::new(classes);
        for (node, class) in pairs {
            coloring.assign(node, class)?;
        }
        Ok(coloring)
    }

    /// Returns `k`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn classes(&self) -> usize { self.classes }

    /// Returns the number of colored nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.assignment.len() }

    /// Returns `true` when no node is colored.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.assignment.is_empty() }

    /// Assigns `node` to `class`, returning its previous class.
    ///
    /// # Errors
    /// Returns [`ColoringError::ClassOutOfRange`] when `class >= k`.
    pub fn assign(
        &mut self,
        node: NodeId,
        class: ClassIndex,
    ) -> Result<Option<ClassIndex>, ColoringError> {
        if class.get() >= self.classes {
            return Err(ColoringError::ClassOutOfRange {
                node,
                class,
                classes: self.classes,
            });
        }
        Ok(self.assignment.insert(node, class))
    }

    /// Returns the class of `node`.
    #[must_use]
    pub fn class_of(&self, node: NodeId) -> Option<ClassIndex> {
        self.assignment.get(&node).copied()
    }

    /// Iterates `(node, class)` in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, ClassIndex)> + '_ {
        self.assignment.iter().map(|(node, class)| (*node, *class))
    }

    /// Returns the members of `class` in ascending id order.
    #[must_use]
    pub fn members(&self, class: ClassIndex) -> Vec<NodeId> {
        self.iter()
            .filter_map(|(node, assigned)| (assigned == class).then_some(node))
            .collect()
    }

    /// Returns the size of every class, indexed by class.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.classes];
        for class in self.assignment.values() {
            if let Some(count) = counts.get_mut(class.get()) {
                *count += 1;
            }
        }
        counts
    }

    /// Returns `max(counts) - min(counts)`, or zero without classes.
    #[must_use]
    pub fn gap(&self) -> usize {
        let counts = self.class_counts();
        let max = counts.iter().max().copied().unwrap_or(0);
        let min = counts.iter().min().copied().unwrap_or(0);
        max - min
    }

    /// Returns `true` when `max(counts) <= min(counts) + 1`.
    #[must_use]
    pub fn is_equitable(&self) -> bool {
        self.gap() <= 1
    }

    /// Returns the edges whose endpoints share a class.
    #[must_use]
    pub fn conflicts(&self, graph: &Graph) -> Vec<Edge> {
        graph
            .edges()
            .iter()
            .filter(|edge| {
                let a = self.class_of(edge.a());
                a.is_some() && a == self.class_of(edge.b())
            })
            .copied()
            .collect()
    }

    /// Returns `true` when no edge joins two nodes of the same class.
    #[must_use]
    pub fn is_proper(&self, graph: &Graph) -> bool {
        self.conflicts(graph).is_empty()
    }

    /// Checks that the coloring covers exactly the nodes of `graph`.
    ///
    /// # Errors
    /// Returns [`ColoringError::UnassignedNode`] or
    /// [`ColoringError::UnknownNode`] for the lowest offending id.
    pub fn validate_for(&self, graph: &Graph) -> Result<(), ColoringError> {
        if let Some(node) = graph.nodes().find(|node| !self.assignment.contains_key(node)) {
            return Err(ColoringError::UnassignedNode { node });
        }
        if let Some(&node) = self.assignment.keys().find(|node| !graph.contains_node(**node)) {
            return Err(ColoringError::UnknownNode { node });
        }
        Ok(())
    }
}

/// Returns the seed class `(id - 1) mod k`, taken as a Euclidean remainder so
/// that id `0` lands in class `k - 1`.
///
/// # Examples
/// ```
/// use equigraph_core::{ClassIndex, NodeId, seed_class};
///
/// assert_eq!(seed_class(NodeId::new(1), 3), ClassIndex::new(0));
/// assert_eq!(seed_class(NodeId::new(5), 3), ClassIndex::new(1));
/// assert_eq!(seed_class(NodeId::new(0), 3), ClassIndex::new(2));
/// ```
#[must_use]
pub fn seed_class(node: NodeId, classes: usize) -> ClassIndex {
    let Ok(k) = u64::try_from(classes) else {
        return ClassIndex::new(0);
    };
    if k == 0 {
        return ClassIndex::new(0);
    }
    let shifted = (u64::from(node.get()) + k - 1) % k;
    ClassIndex::new(usize::try_from(shifted).unwrap_or(0))
}

/// Assigns every node of `graph` its [`seed_class`]. The result is not
/// necessarily proper.
#[must_use]
pub fn seed_coloring(graph: &Graph, classes: usize) -> Coloring {
    Coloring {
        classes,
        assignment: graph
            .nodes()
            .map(|node| (node, seed_class(node, classes)))
            .collect(),
    }
}

/// Colors nodes in ascending id order with the lowest class unused by any
/// already-colored neighbour.
///
/// Succeeds whenever `classes > graph.max_degree()`.
///
/// # Errors
/// Returns [`ColoringError::NoFreeClass`] when a node sees every class among
/// its neighbours.
pub fn greedy_coloring(graph: &Graph, classes: usize) -> Result<Coloring, ColoringError> {
    let adjacency = graph.adjacency();
    let mut coloring = Coloring::new(classes);
    for node in graph.nodes() {
        let mut blocked = vec![false; classes];
        for neighbour in adjacency.neighbours(node) {
            if let Some(slot) = coloring
                .class_of(*neighbour)
                .and_then(|class| blocked.get_mut(class.get()))
            {
                *slot = true;
            }
        }
        let free = blocked
            .iter()
            .position(|taken| !taken)
            .ok_or(ColoringError::NoFreeClass { node, classes })?;
        coloring.assign(node, ClassIndex::new(free))?;
    }
    Ok(coloring)
}

/// Returns the target class sizes for `nodes` nodes over `classes` classes:
/// the first `nodes mod classes` classes hold one extra node.
///
/// # Examples
/// ```
/// use equigraph_core::equitable_sizes;
///
/// assert_eq!(equitable_sizes(7, 4), vec![2, 2, 2, 1]);
/// assert!(equitable_sizes(3, 0).is_empty());
/// ```
#[must_use]
pub fn equitable_sizes(nodes: usize, classes: usize) -> Vec<usize> {
    if classes == 0 {
        return Vec::new();
    }
    let base = nodes / classes;
    let remainder = nodes % classes;
    (0..classes)
        .map(|class| if class < remainder { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod property;
