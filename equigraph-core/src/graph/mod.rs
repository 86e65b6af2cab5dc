//! Undirected graph model shared by every engine component.
//!
//! Nodes are identified by stable integer ids and edges are stored in
//! canonical `(min, max)` form. The edge list keeps insertion order because
//! BFS explores neighbours in that order; a set index rejects duplicates.
//! Adjacency is always recomputed on demand so callers never observe a stale
//! view.

mod adjacency;
mod edge_list;
mod generators;

use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    fmt,
};

use thiserror::Error;

use crate::error::define_error_codes;

pub use self::{
    adjacency::Adjacency,
    edge_list::{EdgeList, ParseError, ParseErrorCode, parse_edge_list},
    generators::{
        EXAMPLE_END, EXAMPLE_START, GenerateError, GenerateErrorCode, Template, example_graph,
        generate,
    },
};

/// Stable identity of a node.
///
/// # Examples
/// ```
/// use equigraph_core::NodeId;
///
/// let id = NodeId::new(7);
/// assert_eq!(id.get(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps a raw identifier.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new(id: u32) -> Self { Self(id) }

    /// Returns the raw identifier.
    #[must_use]
    #[rustfmt::skip]
    pub const fn get(self) -> u32 { self.0 }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by structural graph operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// The referenced node is not part of the graph.
    #[error("node {node} does not exist")]
    NodeNotFound {
        /// The missing node.
        node: NodeId,
    },
    /// A node with this id is already present.
    #[error("node {node} already exists")]
    NodeExists {
        /// The duplicate node id.
        node: NodeId,
    },
    /// Edges must join two distinct nodes.
    #[error("self-loop on node {node} is not allowed")]
    SelfLoop {
        /// The node on both ends of the rejected edge.
        node: NodeId,
    },
    /// The unordered pair is already present.
    #[error("edge {a}-{b} already exists")]
    DuplicateEdge {
        /// Smaller endpoint.
        a: NodeId,
        /// Larger endpoint.
        b: NodeId,
    },
    /// The maximum degree cannot be negative.
    #[error("maximum degree must be non-negative (got {got})")]
    NegativeDegreeBound {
        /// Value supplied by the caller.
        got: i64,
    },
    /// No further node id can be allocated.
    #[error("node id space is exhausted")]
    IdSpaceExhausted,
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The referenced node is not part of the graph.
        NodeNotFound => NodeNotFound { .. } => "GRAPH_NODE_NOT_FOUND",
        /// A node with this id is already present.
        NodeExists => NodeExists { .. } => "GRAPH_NODE_EXISTS",
        /// Edges must join two distinct nodes.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// The unordered pair is already present.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// The maximum degree cannot be negative.
        NegativeDegreeBound => NegativeDegreeBound { .. } => "GRAPH_NEGATIVE_DEGREE_BOUND",
        /// No further node id can be allocated.
        IdSpaceExhausted => IdSpaceExhausted => "GRAPH_ID_SPACE_EXHAUSTED",
    }
}

/// An undirected edge in canonical form (`a < b`).
///
/// # Examples
/// ```
/// use equigraph_core::{Edge, NodeId};
///
/// let edge = Edge::new(NodeId::new(5), NodeId::new(2)).expect("distinct endpoints");
/// assert_eq!(edge.a(), NodeId::new(2));
/// assert_eq!(edge.b(), NodeId::new(5));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Edge {
    a: NodeId,
    b: NodeId,
}

impl Edge {
    /// Normalises `(u, v)` into canonical order.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when `u == v`.
    pub fn new(u: NodeId, v: NodeId) -> Result<Self, GraphError> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Ok(Self { a: u, b: v }),
            std::cmp::Ordering::Greater => Ok(Self { a: v, b: u }),
            std::cmp::Ordering::Equal => Err(GraphError::SelfLoop { node: u }),
        }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn a(&self) -> NodeId { self.a }

    /// Returns the larger endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn b(&self) -> NodeId { self.b }

    /// Returns `true` when `node` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// Returns the endpoint opposite `node`.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// Maximum degree `r` enforced on a graph; colorings use `r + 1` classes.
///
/// # Examples
/// ```
/// use equigraph_core::DegreeBound;
///
/// let bound = DegreeBound::try_from(3_i64).expect("non-negative");
/// assert_eq!(bound.get(), 3);
/// assert_eq!(bound.classes(), 4);
/// assert!(DegreeBound::try_from(-1_i64).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct DegreeBound(usize);

impl DegreeBound {
    /// Creates a bound of `r`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new(r: usize) -> Self { Self(r) }

    /// Returns `r`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn get(self) -> usize { self.0 }

    /// Returns the number of color classes, `k = r + 1`.
    #[must_use]
    pub const fn classes(self) -> usize {
        self.0.saturating_add(1)
    }
}

impl TryFrom<i64> for DegreeBound {
    type Error = GraphError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(Self)
            .map_err(|_| GraphError::NegativeDegreeBound { got: value })
    }
}

impl fmt::Display for DegreeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary statistics of a graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GraphProperties {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Number of connected components.
    pub component_count: usize,
    /// Largest node degree (0 for an empty graph).
    pub max_degree: usize,
}

impl GraphProperties {
    /// Returns `2|E| / |V|`, or `0.0` for an empty graph.
    #[must_use]
    pub fn average_degree(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }
        let total = self.edge_count.saturating_mul(2);
        // Graphs stay tiny, so both counts fit in f64 exactly.
        total as f64 / self.node_count as f64
    }
}

/// Node set plus canonical edge set.
///
/// # Examples
/// ```
/// use equigraph_core::{Graph, NodeId};
///
/// let mut graph = Graph::new();
/// let a = graph.add_node()?;
/// let b = graph.add_node()?;
/// graph.add_edge(a, b)?;
/// assert_eq!(graph.degree(a), 1);
/// assert_eq!(graph.adjacency().neighbours(b), &[a]);
/// # Ok::<(), equigraph_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: BTreeSet<NodeId>,
    edges: Vec<Edge>,
    edge_index: HashSet<Edge>,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Eq for Graph {}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph holding `ids` and no edges.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeExists`] when `ids` repeats an id.
    pub fn with_nodes(ids: impl IntoIterator<Item = NodeId>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for id in ids {
            graph.insert_node(id)?;
        }
        Ok(graph)
    }

    /// Returns the node ids in ascending order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the edges in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Returns the number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Returns the number of edges.
    #[must_use]
    #[rustfmt::skip]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Returns `true` when the graph has no nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Returns `true` when `id` is a node of the graph.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Returns `true` when the unordered pair `{u, v}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, u: NodeId, v: NodeId) -> bool {
        Edge::new(u, v).is_ok_and(|edge| self.edge_index.contains(&edge))
    }

    /// Returns the id the next [`Self::add_node`] call will allocate.
    ///
    /// # Errors
    /// Returns [`GraphError::IdSpaceExhausted`] when the largest id is
    /// `u32::MAX`.
    pub fn next_id(&self) -> Result<NodeId, GraphError> {
        match self.nodes.last() {
            None => Ok(NodeId::new(1)),
            Some(max) => max
                .get()
                .checked_add(1)
                .map(NodeId::new)
                .ok_or(GraphError::IdSpaceExhausted),
        }
    }

    /// Allocates `max id + 1` (or `1` for an empty graph) and inserts it.
    ///
    /// # Errors
    /// Returns [`GraphError::IdSpaceExhausted`] when no id is left.
    pub fn add_node(&mut self) -> Result<NodeId, GraphError> {
        let id = self.next_id()?;
        self.nodes.insert(id);
        Ok(id)
    }

    /// Allocates `count` consecutive ids.
    ///
    /// # Errors
    /// Returns [`GraphError::IdSpaceExhausted`] when the ids would overflow;
    /// the graph is left unchanged in that case.
    pub fn add_nodes(&mut self, count: usize) -> Result<Vec<NodeId>, GraphError> {
        let first = self.next_id()?.get();
        let span = u32::try_from(count).map_err(|_| GraphError::IdSpaceExhausted)?;
        if span > 0 && first.checked_add(span - 1).is_none() {
            return Err(GraphError::IdSpaceExhausted);
        }
        let ids: Vec<NodeId> = (0..span).map(|offset| NodeId::new(first + offset)).collect();
        self.nodes.extend(ids.iter().copied());
        Ok(ids)
    }

    /// Inserts a node with an explicit id.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeExists`] when `id` is already present.
    pub fn insert_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.insert(id) {
            return Err(GraphError::NodeExists { node: id });
        }
        Ok(())
    }

    /// Removes `id` and every incident edge. Returns `false` when `id` was
    /// absent.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.remove(&id) {
            return false;
        }
        self.edges.retain(|edge| !edge.touches(id));
        self.edge_index.retain(|edge| !edge.touches(id));
        true
    }

    /// Adds the undirected edge `{u, v}`.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`], [`GraphError::NodeNotFound`] or
    /// [`GraphError::DuplicateEdge`]; the graph is not modified on failure.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<Edge, GraphError> {
        let edge = self.validate_new_edge(u, v)?;
        self.edges.push(edge);
        self.edge_index.insert(edge);
        Ok(edge)
    }

    fn validate_new_edge(&self, u: NodeId, v: NodeId) -> Result<Edge, GraphError> {
        let edge = Edge::new(u, v)?;
        for endpoint in [u, v] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::NodeNotFound { node: endpoint });
            }
        }
        if self.edge_index.contains(&edge) {
            return Err(GraphError::DuplicateEdge {
                a: edge.a(),
                b: edge.b(),
            });
        }
        Ok(edge)
    }

    /// Removes `{u, v}` regardless of argument order. Returns `false` when no
    /// such edge exists.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let Ok(edge) = Edge::new(u, v) else {
            return false;
        };
        if !self.edge_index.remove(&edge) {
            return false;
        }
        self.edges.retain(|existing| *existing != edge);
        true
    }

    /// Replaces the whole edge set.
    ///
    /// # Errors
    /// Returns the first structural violation in `edges`; the current edge
    /// set is kept in that case.
    pub fn replace_edges(&mut self, edges: &[Edge]) -> Result<(), GraphError> {
        let mut candidate = Self {
            nodes: self.nodes.clone(),
            edges: Vec::with_capacity(edges.len()),
            edge_index: HashSet::with_capacity(edges.len()),
        };
        for edge in edges {
            candidate.add_edge(edge.a(), edge.b())?;
        }
        *self = candidate;
        Ok(())
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.clear_edges();
    }

    /// Removes every edge while keeping the nodes.
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        self.edge_index.clear();
    }

    /// Returns the number of edges incident to `id` (0 for unknown ids).
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    /// Returns the largest degree in the graph.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency().max_degree()
    }

    /// Derives the adjacency view from the current edge set.
    #[must_use]
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::from_graph(self)
    }

    /// Returns the connected components, each sorted by id, ordered by their
    /// smallest member.
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let adjacency = self.adjacency();
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for root in self.nodes() {
            if !seen.insert(root) {
                continue;
            }
            let mut component = vec![root];
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                for &neighbour in adjacency.neighbours(node) {
                    if seen.insert(neighbour) {
                        component.push(neighbour);
                        queue.push_back(neighbour);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Computes summary statistics.
    #[must_use]
    pub fn properties(&self) -> GraphProperties {
        GraphProperties {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            component_count: self.connected_components().len(),
            max_degree: self.max_degree(),
        }
    }

    /// Builds a graph from parsed edge-list text. Declared nodes and every
    /// edge endpoint become nodes; repeated pairs collapse into one edge.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when a pair joins a node to itself.
    pub fn from_edge_list(list: &EdgeList) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for id in list.nodes() {
            graph.nodes.insert(id);
        }
        for &(u, v) in list.pairs() {
            let edge = Edge::new(u, v)?;
            graph.nodes.insert(u);
            graph.nodes.insert(v);
            if graph.edge_index.insert(edge) {
                graph.edges.push(edge);
            }
        }
        Ok(graph)
    }
}
