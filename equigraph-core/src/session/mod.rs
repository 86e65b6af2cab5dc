//! Stateful graph and coloring session.
//!
//! [`Session`] owns the graph, the optional degree bound, explicit class
//! overrides and the edit history. Every mutator either applies completely
//! or leaves the session untouched. Derived views such as the coloring or
//! the auxiliary digraph are recomputed from current state on each call.

mod builder;

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, instrument};

use crate::{
    Result,
    bfs::{BfsTrace, run_bfs},
    coloring::{
        AuxDigraph, ClassIndex, Coloring, ColoringError, RepairOutcome, RepairRun,
        apply_repair_step, build_aux, greedy_coloring, repair_until_equitable, seed_coloring,
    },
    error::{BoundedOperation, SessionError},
    graph::{DegreeBound, Edge, Graph, GraphError, NodeId, Template, generate, parse_edge_list},
    history::History,
};

pub use self::builder::{DEFAULT_HISTORY_DEPTH, SessionBuilder};

/// Mutable graph, degree bound and coloring state behind one surface.
///
/// # Examples
/// ```
/// use equigraph_core::SessionBuilder;
///
/// let mut session = SessionBuilder::new().with_max_degree(2).build()?;
/// let a = session.add_node()?;
/// let b = session.add_node()?;
/// session.add_edge(a, b)?;
///
/// let trace = session.run_bfs(a, b)?;
/// assert_eq!(trace.final_path(), Some([a, b].as_slice()));
/// assert_eq!(session.class_counts()?, vec![1, 1, 0]);
///
/// session.undo()?;
/// assert_eq!(session.graph().edge_count(), 0);
/// # Ok::<(), equigraph_core::SessionError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    graph: Graph,
    degree_bound: Option<DegreeBound>,
    overrides: BTreeMap<NodeId, ClassIndex>,
    history: History,
}

/// Returns the lowest-id node whose degree exceeds `bound`.
fn first_over_bound(graph: &Graph, bound: DegreeBound) -> Option<(NodeId, usize)> {
    graph
        .nodes()
        .map(|node| (node, graph.degree(node)))
        .find(|&(_, degree)| degree > bound.get())
}

fn check_bound(graph: &Graph, bound: Option<DegreeBound>) -> Result<()> {
    let Some(bound) = bound else {
        return Ok(());
    };
    match first_over_bound(graph, bound) {
        Some((node, degree)) => Err(SessionError::DegreeBoundViolated {
            node,
            degree,
            bound: bound.get(),
        }),
        None => Ok(()),
    }
}

impl Session {
    pub(crate) fn from_parts(
        graph: Graph,
        degree_bound: Option<DegreeBound>,
        history: History,
    ) -> Self {
        Self {
            graph,
            degree_bound,
            overrides: BTreeMap::new(),
            history,
        }
    }

    /// Returns the current graph.
    #[must_use]
    #[rustfmt::skip]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Returns the enforced degree bound, if one is set.
    #[must_use]
    #[rustfmt::skip]
    pub const fn degree_bound(&self) -> Option<DegreeBound> { self.degree_bound }

    /// Returns the edit history.
    #[must_use]
    #[rustfmt::skip]
    pub fn history(&self) -> &History { &self.history }

    fn record(&mut self, before: Graph, label: &'static str) {
        self.history.record(before, label);
        debug!(
            operation = label,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "graph edited"
        );
    }

    /// Adds a node with the next free id.
    ///
    /// # Errors
    /// Returns [`GraphError::IdSpaceExhausted`] when no id is left.
    #[instrument(name = "session.add_node", err, skip(self))]
    pub fn add_node(&mut self) -> Result<NodeId> {
        let before = self.graph.clone();
        let id = self.graph.add_node()?;
        self.record(before, "add_node");
        Ok(id)
    }

    /// Adds `count` nodes with consecutive ids as a single edit.
    ///
    /// # Errors
    /// Returns [`GraphError::IdSpaceExhausted`] when the ids would overflow.
    #[instrument(name = "session.add_nodes", err, skip(self))]
    pub fn add_nodes(&mut self, count: usize) -> Result<Vec<NodeId>> {
        let before = self.graph.clone();
        let ids = self.graph.add_nodes(count)?;
        if !ids.is_empty() {
            self.record(before, "add_nodes");
        }
        Ok(ids)
    }

    /// Adds a node with an explicit id.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeExists`] when `id` is taken.
    #[instrument(name = "session.insert_node", err, skip(self, id), fields(node = %id))]
    pub fn insert_node(&mut self, id: NodeId) -> Result<()> {
        let before = self.graph.clone();
        self.graph.insert_node(id)?;
        self.record(before, "insert_node");
        Ok(())
    }

    /// Removes `id` and its incident edges. Returns `false`, recording
    /// nothing, when the node is absent.
    #[instrument(name = "session.remove_node", skip(self, id), fields(node = %id))]
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.graph.clone();
        let removed = self.graph.remove_node(id);
        if removed {
            self.overrides.remove(&id);
            self.record(before, "remove_node");
        }
        removed
    }

    /// Connects `u` and `v`.
    ///
    /// # Errors
    /// Returns the [`GraphError`] raised by [`Graph::add_edge`], or
    /// [`SessionError::DegreeBoundExceeded`] when an endpoint already has the
    /// maximum degree.
    #[instrument(name = "session.add_edge", err, skip(self), fields(u = %u, v = %v))]
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<Edge> {
        let before = self.graph.clone();
        let edge = self.graph.add_edge(u, v)?;
        if let Some(bound) = self.degree_bound
            && let Some(node) = [u, v]
                .into_iter()
                .find(|&node| self.graph.degree(node) > bound.get())
        {
            self.graph = before;
            return Err(SessionError::DegreeBoundExceeded {
                node,
                bound: bound.get(),
            });
        }
        self.record(before, "add_edge");
        Ok(edge)
    }

    /// Removes the edge between `u` and `v`. Returns `false` when absent.
    #[instrument(name = "session.remove_edge", skip(self), fields(u = %u, v = %v))]
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let before = self.graph.clone();
        let removed = self.graph.remove_edge(u, v);
        if removed {
            self.record(before, "remove_edge");
        }
        removed
    }

    /// Removes every node and edge.
    #[instrument(name = "session.clear", skip(self))]
    pub fn clear(&mut self) {
        let before = self.graph.clone();
        self.graph.clear();
        self.overrides.clear();
        self.record(before, "clear");
    }

    /// Removes every edge, keeping the nodes.
    #[instrument(name = "session.clear_edges", skip(self))]
    pub fn clear_edges(&mut self) {
        let before = self.graph.clone();
        self.graph.clear_edges();
        self.record(before, "clear_edges");
    }

    /// Replaces the edge set with the pairs listed in `text`.
    ///
    /// Duplicate pairs collapse silently. With a degree bound in force every
    /// node must end with a degree between 1 and the bound.
    ///
    /// # Errors
    /// * [`SessionError::Parse`] for malformed text.
    /// * [`SessionError::InsufficientNodes`] with fewer than two nodes.
    /// * [`SessionError::EmptyEdgeList`] when the text lists no pair.
    /// * [`GraphError::NodeNotFound`] for unknown ids and
    ///   [`GraphError::SelfLoop`] for `u-u` pairs.
    /// * [`SessionError::IsolatedNode`] and
    ///   [`SessionError::DegreeBoundViolated`] when the bound is not met.
    #[instrument(name = "session.apply_edge_list", err, skip(self, text))]
    pub fn apply_edge_list(&mut self, text: &str) -> Result<usize> {
        let list = parse_edge_list(text)?;
        let nodes = self.graph.node_count();
        if nodes < 2 {
            return Err(SessionError::InsufficientNodes {
                required: 2,
                got: nodes,
            });
        }
        if list.has_no_edges() {
            return Err(SessionError::EmptyEdgeList);
        }
        let endpoints = list.pairs().iter().flat_map(|&(u, v)| [u, v]);
        if let Some(node) = list
            .nodes()
            .chain(endpoints)
            .find(|&node| !self.graph.contains_node(node))
        {
            return Err(GraphError::NodeNotFound { node }.into());
        }

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for &(u, v) in list.pairs() {
            let edge = Edge::new(u, v)?;
            if seen.insert(edge) {
                edges.push(edge);
            }
        }

        let mut candidate = self.graph.clone();
        candidate.replace_edges(&edges)?;
        if let Some(bound) = self.degree_bound {
            if let Some(node) = candidate.nodes().find(|&node| candidate.degree(node) == 0) {
                return Err(SessionError::IsolatedNode { node });
            }
            check_bound(&candidate, Some(bound))?;
        }

        let before = std::mem::replace(&mut self.graph, candidate);
        self.record(before, "apply_edge_list");
        Ok(edges.len())
    }

    /// Replaces the edge set with one built by `template`.
    ///
    /// # Errors
    /// Returns [`SessionError::Generate`] when the template cannot be built
    /// for the current node count and degree bound.
    #[instrument(
        name = "session.generate",
        err,
        skip(self, template),
        fields(template = template.name()),
    )]
    pub fn generate(&mut self, template: Template) -> Result<usize> {
        let edges = generate(&self.graph, template, self.degree_bound)?;
        let mut candidate = self.graph.clone();
        candidate.replace_edges(&edges)?;
        let before = std::mem::replace(&mut self.graph, candidate);
        self.record(before, "generate");
        Ok(edges.len())
    }

    /// Sets the maximum degree `r`, giving `r + 1` color classes.
    ///
    /// Explicit class overrides are dropped because the class count changes.
    ///
    /// # Errors
    /// Returns [`GraphError::NegativeDegreeBound`] for `r < 0` and
    /// [`SessionError::DegreeBoundViolated`] when a node already has more
    /// than `r` edges.
    #[instrument(name = "session.set_max_degree", err, skip(self))]
    pub fn set_max_degree(&mut self, r: i64) -> Result<DegreeBound> {
        let bound = DegreeBound::try_from(r)?;
        check_bound(&self.graph, Some(bound))?;
        self.degree_bound = Some(bound);
        self.overrides.clear();
        info!(classes = bound.classes(), "degree bound set");
        Ok(bound)
    }

    /// Removes the degree bound and any explicit class overrides.
    pub fn clear_max_degree(&mut self) {
        self.degree_bound = None;
        self.overrides.clear();
    }

    fn require_bound(&self, operation: BoundedOperation) -> Result<DegreeBound> {
        self.degree_bound
            .ok_or(SessionError::DegreeBoundRequired { operation })
    }

    /// Installs explicit classes for the nodes `coloring` covers. Nodes it
    /// leaves out fall back to the seed class.
    ///
    /// # Errors
    /// * [`SessionError::DegreeBoundRequired`] without a degree bound.
    /// * [`ColoringError::ClassCountMismatch`] unless the coloring has
    ///   `r + 1` classes.
    /// * [`ColoringError::UnknownNode`] for nodes outside the graph.
    #[instrument(
        name = "session.set_coloring",
        err,
        skip(self, coloring),
        fields(classes = coloring.classes()),
    )]
    pub fn set_coloring(&mut self, coloring: &Coloring) -> Result<()> {
        let bound = self.require_bound(BoundedOperation::SetColoring)?;
        if coloring.classes() != bound.classes() {
            return Err(ColoringError::ClassCountMismatch {
                expected: bound.classes(),
                got: coloring.classes(),
            }
            .into());
        }
        if let Some((node, _)) = coloring
            .iter()
            .find(|&(node, _)| !self.graph.contains_node(node))
        {
            return Err(ColoringError::UnknownNode { node }.into());
        }
        self.overrides = coloring.iter().collect();
        Ok(())
    }

    /// Replaces the overrides with a proper greedy coloring.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound
    /// and [`ColoringError::NoFreeClass`] if greedy assignment runs out of
    /// classes.
    #[instrument(name = "session.seed_with_greedy", err, skip(self))]
    pub fn seed_with_greedy(&mut self) -> Result<Coloring> {
        let bound = self.require_bound(BoundedOperation::SetColoring)?;
        let coloring = greedy_coloring(&self.graph, bound.classes())?;
        self.overrides = coloring.iter().collect();
        Ok(coloring)
    }

    /// Drops overrides for nodes the graph no longer holds, so a later
    /// node reusing the id starts from its seed class.
    fn prune_overrides(&mut self) {
        let graph = &self.graph;
        self.overrides.retain(|node, _| graph.contains_node(*node));
    }

    fn resolve_coloring(&self, operation: BoundedOperation) -> Result<Coloring> {
        let bound = self.require_bound(operation)?;
        let mut coloring = seed_coloring(&self.graph, bound.classes());
        for (&node, &class) in &self.overrides {
            if self.graph.contains_node(node) {
                coloring.assign(node, class)?;
            }
        }
        Ok(coloring)
    }

    /// Returns the current coloring: explicit overrides for nodes still
    /// present, seed classes for the rest.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound.
    pub fn coloring(&self) -> Result<Coloring> {
        self.resolve_coloring(BoundedOperation::Coloring)
    }

    /// Returns the size of every class.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound.
    pub fn class_counts(&self) -> Result<Vec<usize>> {
        Ok(self.coloring()?.class_counts())
    }

    /// Returns `true` when class sizes differ by at most one.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound.
    pub fn is_equitable(&self) -> Result<bool> {
        Ok(self.coloring()?.is_equitable())
    }

    /// Builds the auxiliary digraph of the current coloring.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound.
    pub fn aux_digraph(&self) -> Result<AuxDigraph> {
        let coloring = self.resolve_coloring(BoundedOperation::AuxDigraph)?;
        Ok(build_aux(&self.graph, &coloring))
    }

    /// Runs one repair step, storing the new coloring when it applies.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundRequired`] without a degree bound
    /// and [`SessionError::Coloring`] for rejected input.
    #[instrument(name = "session.repair_step", err, skip(self))]
    pub fn repair_step(&mut self) -> Result<RepairOutcome> {
        let coloring = self.resolve_coloring(BoundedOperation::Repair)?;
        let outcome = apply_repair_step(&self.graph, &coloring)?;
        if let RepairOutcome::Applied(step) = &outcome {
            self.overrides = step.coloring().iter().collect();
        }
        Ok(outcome)
    }

    /// Repeats [`Session::repair_step`] for at most `max_steps` steps.
    ///
    /// # Errors
    /// As [`Session::repair_step`].
    #[instrument(name = "session.repair_until_equitable", err, skip(self))]
    pub fn repair_until_equitable(&mut self, max_steps: usize) -> Result<RepairRun> {
        let coloring = self.resolve_coloring(BoundedOperation::Repair)?;
        let run = repair_until_equitable(&self.graph, &coloring, max_steps)?;
        if !run.steps().is_empty() {
            self.overrides = run.final_coloring().iter().collect();
        }
        Ok(run)
    }

    /// Runs BFS from `start` to `end` on the current graph.
    ///
    /// # Errors
    /// Returns [`SessionError::Bfs`] for unknown endpoints.
    pub fn run_bfs(&self, start: NodeId, end: NodeId) -> Result<BfsTrace> {
        Ok(run_bfs(&self.graph, start, end)?)
    }

    /// Reverts the latest edit, returning its name, or `None` when there is
    /// nothing to undo.
    ///
    /// # Errors
    /// Returns [`SessionError::DegreeBoundViolated`], changing nothing, when
    /// the earlier graph breaks the degree bound set since.
    #[instrument(name = "session.undo", err, skip(self))]
    pub fn undo(&mut self) -> Result<Option<&'static str>> {
        let Some(snapshot) = self.history.peek_undo() else {
            return Ok(None);
        };
        check_bound(snapshot.graph(), self.degree_bound)?;
        let current = self.graph.clone();
        let Some(snapshot) = self.history.undo(current) else {
            return Ok(None);
        };
        let label = snapshot.label();
        self.graph = snapshot.into_graph();
        self.prune_overrides();
        info!(operation = label, "undo applied");
        Ok(Some(label))
    }

    /// Re-applies the latest undone edit, returning its name, or `None`
    /// when there is nothing to redo.
    ///
    /// # Errors
    /// As [`Session::undo`].
    #[instrument(name = "session.redo", err, skip(self))]
    pub fn redo(&mut self) -> Result<Option<&'static str>> {
        let Some(snapshot) = self.history.peek_redo() else {
            return Ok(None);
        };
        check_bound(snapshot.graph(), self.degree_bound)?;
        let current = self.graph.clone();
        let Some(snapshot) = self.history.redo(current) else {
            return Ok(None);
        };
        let label = snapshot.label();
        self.graph = snapshot.into_graph();
        self.prune_overrides();
        info!(operation = label, "redo applied");
        Ok(Some(label))
    }
}

#[cfg(test)]
mod tests;
