//! Structured edge-set generators.
//!
//! Each generator inspects the current node set and returns a complete
//! replacement edge list, or an error before anything is touched. None of
//! them guarantee more than what their documentation states; they are
//! convenience constructors for exploring the repair procedure.

use std::collections::{BTreeMap, HashSet};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::{debug, instrument};

use super::{DegreeBound, Edge, Graph, NodeId};
use crate::{coloring::seed_class, error::define_error_codes};

/// Suggested BFS source for [`example_graph`].
pub const EXAMPLE_START: NodeId = NodeId::new(6);
/// Suggested BFS target for [`example_graph`].
pub const EXAMPLE_END: NodeId = NodeId::new(10);

/// Edge-set templates understood by [`generate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Template {
    /// Every pair of nodes joined.
    Complete,
    /// A single cycle through the nodes in id order.
    Cycle,
    /// The lowest id joined to every other node.
    Star,
    /// A path in id order plus short chords, capped by the degree bound.
    Connected,
    /// Edges concentrated inside seed color classes.
    ConflictProne,
    /// Up to `count` random extra edges on top of the current ones.
    Random {
        /// Number of edges to try to add.
        count: usize,
        /// Seed for the random number generator.
        seed: u64,
    },
}

impl Template {
    /// Returns the lowercase template name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cycle => "cycle",
            Self::Star => "star",
            Self::Connected => "connected",
            Self::ConflictProne => "conflict-prone",
            Self::Random { .. } => "random",
        }
    }
}

/// Reasons a generator refuses to build an edge set.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GenerateError {
    /// The template needs more nodes.
    #[error("{template} graph needs at least {required} nodes (got {got})")]
    NotEnoughNodes {
        /// Template name.
        template: &'static str,
        /// Minimum node count.
        required: usize,
        /// Nodes present.
        got: usize,
    },
    /// The template only makes sense under a degree bound.
    #[error("{template} graph requires a maximum degree to be set")]
    DegreeBoundRequired {
        /// Template name.
        template: &'static str,
    },
    /// The degree bound is below what the template needs.
    #[error("cannot create {template} graph: maximum degree {bound} is less than required {required}")]
    DegreeBoundTooLow {
        /// Template name.
        template: &'static str,
        /// Degree the template needs.
        required: usize,
        /// Enforced bound.
        bound: usize,
    },
    /// No connected graph on this many nodes respects the bound.
    #[error("impossible: a connected graph with max degree {bound} needs n <= {max_nodes} (got {nodes})")]
    CannotConnect {
        /// Enforced bound.
        bound: usize,
        /// Largest node count the bound can connect.
        max_nodes: usize,
        /// Nodes present.
        nodes: usize,
    },
    /// A node could not receive any edge under the bound.
    #[error("could not give node {node} at least one edge under r={bound}")]
    PlacementFailed {
        /// The node left isolated.
        node: NodeId,
        /// Enforced bound.
        bound: usize,
    },
    /// Every possible edge already exists.
    #[error("graph is already complete")]
    GraphSaturated,
    /// A random generator was asked for zero edges.
    #[error("edge count must be positive")]
    InvalidEdgeCount,
}

define_error_codes! {
    /// Stable codes describing [`GenerateError`] variants.
    enum GenerateErrorCode for GenerateError {
        /// The template needs more nodes.
        NotEnoughNodes => NotEnoughNodes { .. } => "GENERATE_NOT_ENOUGH_NODES",
        /// A degree bound is required.
        DegreeBoundRequired => DegreeBoundRequired { .. } => "GENERATE_DEGREE_BOUND_REQUIRED",
        /// The degree bound is too low.
        DegreeBoundTooLow => DegreeBoundTooLow { .. } => "GENERATE_DEGREE_BOUND_TOO_LOW",
        /// No connected graph respects the bound.
        CannotConnect => CannotConnect { .. } => "GENERATE_CANNOT_CONNECT",
        /// A node could not be given an edge.
        PlacementFailed => PlacementFailed { .. } => "GENERATE_PLACEMENT_FAILED",
        /// Every possible edge already exists.
        GraphSaturated => GraphSaturated => "GENERATE_GRAPH_SATURATED",
        /// Zero edges were requested.
        InvalidEdgeCount => InvalidEdgeCount => "GENERATE_INVALID_EDGE_COUNT",
    }
}

/// Builds the edge set `template` describes for the nodes of `graph`.
///
/// The result replaces the current edges: every template except
/// [`Template::Random`] ignores the existing edge set, while `Random` returns
/// the existing edges followed by the new ones.
///
/// # Errors
/// Returns a [`GenerateError`] describing why the template cannot be built.
///
/// # Examples
/// ```
/// use equigraph_core::{DegreeBound, Graph, Template, generate};
///
/// let mut graph = Graph::new();
/// graph.add_nodes(4)?;
/// let edges = generate(&graph, Template::Cycle, Some(DegreeBound::new(2)))?;
/// assert_eq!(edges.len(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "graph.generate",
    err,
    skip(graph),
    fields(template = template.name(), nodes = graph.node_count(), bound = ?bound.map(DegreeBound::get)),
)]
pub fn generate(
    graph: &Graph,
    template: Template,
    bound: Option<DegreeBound>,
) -> Result<Vec<Edge>, GenerateError> {
    let ids: Vec<NodeId> = graph.nodes().collect();
    let edges = match template {
        Template::Complete => complete(&ids, bound)?,
        Template::Cycle => cycle(&ids, bound)?,
        Template::Star => star(&ids, bound)?,
        Template::Connected => connected(&ids, bound)?,
        Template::ConflictProne => conflict_prone(&ids, bound)?,
        Template::Random { count, seed } => random(graph, &ids, bound, count, seed)?,
    };
    debug!(edges = edges.len(), "generated edge set");
    Ok(edges)
}

fn require_nodes(
    template: Template,
    ids: &[NodeId],
    required: usize,
) -> Result<(), GenerateError> {
    if ids.len() < required {
        return Err(GenerateError::NotEnoughNodes {
            template: template.name(),
            required,
            got: ids.len(),
        });
    }
    Ok(())
}

fn require_degree(
    template: Template,
    bound: Option<DegreeBound>,
    required: usize,
) -> Result<(), GenerateError> {
    match bound {
        Some(bound) if bound.get() < required => Err(GenerateError::DegreeBoundTooLow {
            template: template.name(),
            required,
            bound: bound.get(),
        }),
        _ => Ok(()),
    }
}

fn pair(u: NodeId, v: NodeId) -> Option<Edge> {
    Edge::new(u, v).ok()
}

fn complete(ids: &[NodeId], bound: Option<DegreeBound>) -> Result<Vec<Edge>, GenerateError> {
    require_nodes(Template::Complete, ids, 2)?;
    require_degree(Template::Complete, bound, ids.len() - 1)?;
    Ok(ids
        .iter()
        .enumerate()
        .flat_map(|(i, &u)| ids.iter().skip(i + 1).filter_map(move |&v| pair(u, v)))
        .collect())
}

fn cycle(ids: &[NodeId], bound: Option<DegreeBound>) -> Result<Vec<Edge>, GenerateError> {
    require_nodes(Template::Cycle, ids, 3)?;
    require_degree(Template::Cycle, bound, 2)?;
    Ok(ids
        .iter()
        .zip(ids.iter().cycle().skip(1))
        .filter_map(|(&u, &v)| pair(u, v))
        .collect())
}

fn star(ids: &[NodeId], bound: Option<DegreeBound>) -> Result<Vec<Edge>, GenerateError> {
    require_nodes(Template::Star, ids, 2)?;
    require_degree(Template::Star, bound, ids.len() - 1)?;
    let Some((&centre, leaves)) = ids.split_first() else {
        return Ok(Vec::new());
    };
    Ok(leaves.iter().filter_map(|&leaf| pair(centre, leaf)).collect())
}

fn required_bound(template: Template, bound: Option<DegreeBound>) -> Result<usize, GenerateError> {
    bound
        .map(DegreeBound::get)
        .ok_or(GenerateError::DegreeBoundRequired {
            template: template.name(),
        })
}

fn connected(ids: &[NodeId], bound: Option<DegreeBound>) -> Result<Vec<Edge>, GenerateError> {
    let r = required_bound(Template::Connected, bound)?;
    require_nodes(Template::Connected, ids, 2)?;
    let n = ids.len();
    if (r == 0 && n > 1) || (r == 1 && n > 2) {
        return Err(GenerateError::CannotConnect {
            bound: r,
            max_nodes: r + 1,
            nodes: n,
        });
    }

    let mut acc = EdgeAccumulator::new(Some(r));
    for window in ids.windows(2) {
        if let [u, v] = window {
            acc.try_add(*u, *v);
        }
    }
    for stride in 2..=r {
        for (i, &u) in ids.iter().enumerate() {
            let Some(&v) = ids.get(i + stride) else {
                break;
            };
            acc.try_add(u, v);
        }
    }
    Ok(acc.into_edges())
}

fn conflict_prone(ids: &[NodeId], bound: Option<DegreeBound>) -> Result<Vec<Edge>, GenerateError> {
    let r = required_bound(Template::ConflictProne, bound)?;
    require_degree(Template::ConflictProne, bound, 1)?;
    require_nodes(Template::ConflictProne, ids, 2)?;

    let k = r + 1;
    let mut groups: Vec<Vec<NodeId>> = vec![Vec::new(); k];
    for &id in ids {
        if let Some(group) = groups.get_mut(seed_class(id, k).get()) {
            group.push(id);
        }
    }

    let mut acc = EdgeAccumulator::new(Some(r));
    for group in &groups {
        for window in group.windows(2) {
            if let [u, v] = window {
                acc.try_add(*u, *v);
            }
        }
    }

    for (index, &id) in ids.iter().enumerate() {
        if acc.degree(id) >= 1 {
            continue;
        }
        let same_class = groups
            .get(seed_class(id, k).get())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut placed = same_class
            .iter()
            .filter(|&&other| other != id)
            .any(|&other| acc.try_add(id, other));
        if !placed {
            let next = ids.get(index + 1);
            let previous = index.checked_sub(1).and_then(|prev| ids.get(prev));
            placed = [next, previous]
                .into_iter()
                .flatten()
                .any(|&other| acc.try_add(id, other));
        }
        if !placed {
            return Err(GenerateError::PlacementFailed { node: id, bound: r });
        }
    }

    for group in &groups {
        for (i, &u) in group.iter().enumerate() {
            let Some(&v) = group.get(i + 2) else {
                break;
            };
            acc.try_add(u, v);
        }
    }

    for window in ids.windows(2) {
        if let [u, v] = window {
            acc.try_add(*u, *v);
        }
    }
    Ok(acc.into_edges())
}

fn random(
    graph: &Graph,
    ids: &[NodeId],
    bound: Option<DegreeBound>,
    count: usize,
    seed: u64,
) -> Result<Vec<Edge>, GenerateError> {
    let template = Template::Random { count, seed };
    require_nodes(template, ids, 2)?;
    if count == 0 {
        return Err(GenerateError::InvalidEdgeCount);
    }
    let possible = ids.len() * (ids.len() - 1) / 2;
    let wanted = count.min(possible.saturating_sub(graph.edge_count()));
    if wanted == 0 {
        return Err(GenerateError::GraphSaturated);
    }

    let mut acc = EdgeAccumulator::new(bound.map(DegreeBound::get));
    for edge in graph.edges() {
        acc.push_existing(*edge);
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut added = 0;
    let mut attempts = 0;
    let max_attempts = wanted.saturating_mul(20);
    while added < wanted && attempts < max_attempts {
        attempts += 1;
        let from = ids.get(rng.gen_range(0..ids.len()));
        let to = ids.get(rng.gen_range(0..ids.len()));
        if let (Some(&u), Some(&v)) = (from, to)
            && acc.try_add(u, v)
        {
            added += 1;
        }
    }
    debug!(added, attempts, "random edges placed");
    Ok(acc.into_edges())
}

/// Collects edges while tracking degrees against an optional cap.
struct EdgeAccumulator {
    cap: Option<usize>,
    degrees: BTreeMap<NodeId, usize>,
    seen: HashSet<Edge>,
    edges: Vec<Edge>,
}

impl EdgeAccumulator {
    fn new(cap: Option<usize>) -> Self {
        Self {
            cap,
            degrees: BTreeMap::new(),
            seen: HashSet::new(),
            edges: Vec::new(),
        }
    }

    fn degree(&self, id: NodeId) -> usize {
        self.degrees.get(&id).copied().unwrap_or(0)
    }

    fn has_room(&self, id: NodeId) -> bool {
        self.cap.is_none_or(|cap| self.degree(id) < cap)
    }

    fn push_existing(&mut self, edge: Edge) {
        if self.seen.insert(edge) {
            self.record(edge);
        }
    }

    fn record(&mut self, edge: Edge) {
        *self.degrees.entry(edge.a()).or_default() += 1;
        *self.degrees.entry(edge.b()).or_default() += 1;
        self.edges.push(edge);
    }

    /// Adds `{u, v}` unless it is a loop, a duplicate, or saturates an
    /// endpoint.
    fn try_add(&mut self, u: NodeId, v: NodeId) -> bool {
        let Some(edge) = pair(u, v) else {
            return false;
        };
        if self.seen.contains(&edge) || !self.has_room(u) || !self.has_room(v) {
            return false;
        }
        self.seen.insert(edge);
        self.record(edge);
        true
    }

    fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

const EXAMPLE_NODES: [u32; 16] = [6, 5, 4, 3, 8, 7, 0, 1, 2, 12, 13, 14, 15, 11, 10, 9];

const EXAMPLE_EDGES: [(u32, u32); 23] = [
    (6, 5),
    (5, 4),
    (4, 3),
    (3, 8),
    (6, 7),
    (5, 0),
    (4, 1),
    (3, 2),
    (8, 9),
    (7, 0),
    (0, 1),
    (1, 2),
    (7, 12),
    (12, 13),
    (13, 14),
    (14, 11),
    (11, 10),
    (2, 15),
    (2, 13),
    (15, 14),
    (15, 9),
    (15, 11),
    (9, 10),
];

/// Returns the 16-node teaching graph (ids `0..=15`, maximum degree 4).
///
/// [`EXAMPLE_START`] and [`EXAMPLE_END`] make a good first BFS query.
///
/// # Examples
/// ```
/// use equigraph_core::example_graph;
///
/// let graph = example_graph();
/// assert_eq!(graph.node_count(), 16);
/// assert_eq!(graph.edge_count(), 23);
/// ```
#[must_use]
pub fn example_graph() -> Graph {
    let mut graph = Graph::new();
    for id in EXAMPLE_NODES {
        graph.nodes.insert(NodeId::new(id));
    }
    for (u, v) in EXAMPLE_EDGES {
        if let Ok(edge) = Edge::new(NodeId::new(u), NodeId::new(v))
            && graph.edge_index.insert(edge)
        {
            graph.edges.push(edge);
        }
    }
    graph
}

#[cfg(test)]
mod tests;
