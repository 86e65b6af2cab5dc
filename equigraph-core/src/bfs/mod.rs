//! Step-generating breadth-first shortest-path search.
//!
//! [`run_bfs`] executes one query to completion and records a full snapshot
//! of the algorithm state after every transition. Snapshots never share
//! mutable state, so replay in either direction is plain indexing.

mod cursor;

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    error::define_error_codes,
    graph::{Graph, NodeId},
};

pub use self::cursor::BfsCursor;

/// Which endpoint of a query a node id was supplied for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EndpointRole {
    /// The BFS source.
    Start,
    /// The BFS target.
    End,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

/// Errors raised while validating a BFS query.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BfsError {
    /// The requested endpoint is not a node of the graph.
    #[error("{role} node {node} does not exist")]
    NodeNotFound {
        /// Which endpoint was missing.
        role: EndpointRole,
        /// The missing id.
        node: NodeId,
    },
}

define_error_codes! {
    /// Stable codes describing [`BfsError`] variants.
    enum BfsErrorCode for BfsError {
        /// The requested endpoint is not a node of the graph.
        NodeNotFound => NodeNotFound { .. } => "BFS_NODE_NOT_FOUND",
    }
}

/// Transition recorded by a [`BfsStep`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum BfsAction {
    /// The start node was enqueued.
    Initialize,
    /// A node was removed from the front of the queue.
    Dequeue,
    /// Unvisited neighbours of the current node were enqueued.
    Explore,
    /// The current node had no unvisited neighbours.
    NoNeighbors,
    /// The target was dequeued; the path is known.
    Found,
    /// The queue drained without reaching the target.
    NotFound,
}

impl BfsAction {
    /// Returns the snake-case action label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Dequeue => "dequeue",
            Self::Explore => "explore",
            Self::NoNeighbors => "no_neighbors",
            Self::Found => "found",
            Self::NotFound => "not_found",
        }
    }

    /// Returns `true` for the two actions that end a trace.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Found | Self::NotFound)
    }
}

impl fmt::Display for BfsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete snapshot of the search after one transition.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BfsStep {
    /// Zero-based position within the trace.
    pub step_index: usize,
    /// Transition that produced this snapshot.
    pub action: BfsAction,
    /// Pending nodes, front first.
    pub queue: Vec<NodeId>,
    /// Nodes discovered so far.
    pub visited: BTreeSet<NodeId>,
    /// Node being processed, `None` only for `not_found`.
    pub current: Option<NodeId>,
    /// Nodes enqueued by this step, in discovery order.
    pub newly_discovered: Vec<NodeId>,
    /// Discovering node for every visited node except the start.
    pub parent: BTreeMap<NodeId, NodeId>,
    /// Hop count from the start for every visited node.
    pub distance: BTreeMap<NodeId, usize>,
    /// Whether the target has been reached.
    pub path_found: bool,
    /// Start-to-end path, empty unless `path_found`.
    pub final_path: Vec<NodeId>,
}

impl BfsStep {
    /// Returns a one-line human description of the transition.
    ///
    /// `end` is the query target, used by the `found` and `not_found` lines.
    #[must_use]
    pub fn describe(&self, start: NodeId, end: NodeId) -> String {
        let current = self
            .current
            .map_or_else(|| String::from("-"), |node| node.to_string());
        match self.action {
            BfsAction::Initialize => format!("Initialize BFS with start node {start}"),
            BfsAction::Dequeue => format!("Dequeue node {current} from front of queue"),
            BfsAction::Explore => format!(
                "Exploring neighbours of {current}. Adding unvisited: [{}]",
                join(&self.newly_discovered)
            ),
            BfsAction::NoNeighbors => format!("Node {current} has no unvisited neighbours"),
            BfsAction::Found => format!(
                "Target node {end} found! Path: [{}]",
                join(&self.final_path)
            ),
            BfsAction::NotFound => {
                format!("Queue is empty. No path exists from {start} to {end}")
            }
        }
    }
}

fn join(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Immutable, replayable record of one BFS query.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BfsTrace {
    start: NodeId,
    end: NodeId,
    steps: Vec<BfsStep>,
}

impl BfsTrace {
    /// Returns the query source.
    #[must_use]
    #[rustfmt::skip]
    pub const fn start(&self) -> NodeId { self.start }

    /// Returns the query target.
    #[must_use]
    #[rustfmt::skip]
    pub const fn end(&self) -> NodeId { self.end }

    /// Returns every snapshot in order.
    #[must_use]
    #[rustfmt::skip]
    pub fn steps(&self) -> &[BfsStep] { &self.steps }

    /// Returns the number of snapshots.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.steps.len() }

    /// Always `false`: a trace holds at least the initial and terminal steps.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// Returns the snapshot at `index`.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&BfsStep> {
        self.steps.get(index)
    }

    /// Returns the snapshot at `index`, clamped to the last step.
    #[must_use]
    pub fn go_to_step(&self, index: usize) -> Option<&BfsStep> {
        let last = self.steps.len().checked_sub(1)?;
        self.steps.get(index.min(last))
    }

    /// Returns the terminal snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&BfsStep> {
        self.steps.last()
    }

    /// Returns `true` when the target was reached.
    #[must_use]
    pub fn path_found(&self) -> bool {
        self.last().is_some_and(|step| step.path_found)
    }

    /// Returns the shortest path, or `None` when the target is unreachable.
    #[must_use]
    pub fn final_path(&self) -> Option<&[NodeId]> {
        self.last()
            .filter(|step| step.path_found)
            .map(|step| step.final_path.as_slice())
    }

    /// Returns a cursor positioned on the first step.
    #[must_use]
    pub fn cursor(&self) -> BfsCursor<'_> {
        BfsCursor::new(self)
    }
}

/// Mutable search state that is snapshotted into [`BfsStep`]s.
struct Frontier {
    queue: VecDeque<NodeId>,
    visited: BTreeSet<NodeId>,
    parent: BTreeMap<NodeId, NodeId>,
    distance: BTreeMap<NodeId, usize>,
    steps: Vec<BfsStep>,
}

impl Frontier {
    fn new(start: NodeId) -> Self {
        Self {
            queue: VecDeque::from([start]),
            visited: BTreeSet::from([start]),
            parent: BTreeMap::new(),
            distance: BTreeMap::from([(start, 0)]),
            steps: Vec::new(),
        }
    }

    fn record(
        &mut self,
        action: BfsAction,
        current: Option<NodeId>,
        newly_discovered: Vec<NodeId>,
        final_path: Vec<NodeId>,
    ) {
        let step = BfsStep {
            step_index: self.steps.len(),
            action,
            queue: self.queue.iter().copied().collect(),
            visited: self.visited.clone(),
            current,
            newly_discovered,
            parent: self.parent.clone(),
            distance: self.distance.clone(),
            path_found: action == BfsAction::Found,
            final_path,
        };
        self.steps.push(step);
    }

    fn path_to(&self, end: NodeId) -> Vec<NodeId> {
        let mut path = vec![end];
        let mut node = end;
        while let Some(&previous) = self.parent.get(&node) {
            path.push(previous);
            node = previous;
        }
        path.reverse();
        path
    }
}

/// Runs a BFS from `start` to `end` and records every transition.
///
/// # Errors
/// Returns [`BfsError::NodeNotFound`] when either endpoint is absent.
///
/// # Examples
/// ```
/// use equigraph_core::{BfsAction, Graph, NodeId, run_bfs};
///
/// let mut graph = Graph::new();
/// let ids = graph.add_nodes(3)?;
/// graph.add_edge(ids[0], ids[1])?;
/// graph.add_edge(ids[1], ids[2])?;
///
/// let trace = run_bfs(&graph, ids[0], ids[2])?;
/// assert_eq!(trace.final_path(), Some(ids.as_slice()));
/// assert_eq!(trace.last().map(|step| step.action), Some(BfsAction::Found));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "bfs.run",
    err,
    skip(graph),
    fields(start = %start, end = %end, nodes = graph.node_count()),
)]
pub fn run_bfs(graph: &Graph, start: NodeId, end: NodeId) -> Result<BfsTrace, BfsError> {
    if !graph.contains_node(start) {
        return Err(BfsError::NodeNotFound {
            role: EndpointRole::Start,
            node: start,
        });
    }
    if !graph.contains_node(end) {
        return Err(BfsError::NodeNotFound {
            role: EndpointRole::End,
            node: end,
        });
    }

    let adjacency = graph.adjacency();
    let mut frontier = Frontier::new(start);
    frontier.record(BfsAction::Initialize, Some(start), Vec::new(), Vec::new());

    let mut found = false;
    while let Some(current) = frontier.queue.pop_front() {
        frontier.record(BfsAction::Dequeue, Some(current), Vec::new(), Vec::new());
        if current == end {
            let path = frontier.path_to(end);
            frontier.record(BfsAction::Found, Some(current), Vec::new(), path);
            found = true;
            break;
        }

        let next_distance = frontier.distance.get(&current).map_or(1, |d| d + 1);
        let mut discovered = Vec::new();
        for &neighbour in adjacency.neighbours(current) {
            if frontier.visited.insert(neighbour) {
                frontier.queue.push_back(neighbour);
                frontier.parent.insert(neighbour, current);
                frontier.distance.insert(neighbour, next_distance);
                discovered.push(neighbour);
            }
        }
        let action = if discovered.is_empty() {
            BfsAction::NoNeighbors
        } else {
            BfsAction::Explore
        };
        frontier.record(action, Some(current), discovered, Vec::new());
    }

    if !found {
        frontier.record(BfsAction::NotFound, None, Vec::new(), Vec::new());
    }

    let steps = frontier.steps;
    debug!(steps = steps.len(), found, "bfs trace complete");
    record_run(steps.len());
    Ok(BfsTrace { start, end, steps })
}

#[cfg(feature = "metrics")]
fn record_run(steps: usize) {
    metrics::counter!("bfs_runs").increment(1);
    metrics::counter!("bfs_steps_emitted").increment(steps as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_run(_steps: usize) {}

#[cfg(test)]
mod property;
