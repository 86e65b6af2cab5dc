//! Snapshot-based undo and redo for graph edits.
//!
//! Every recorded edit stores the full graph as it was before the edit.
//! Graphs here hold tens of nodes, so whole snapshots stay cheap and keep
//! restoration trivially correct.

use std::{collections::VecDeque, num::NonZeroUsize};

use crate::graph::Graph;

/// Graph state paired with the edit that moved away from it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    graph: Graph,
    label: &'static str,
}

impl Snapshot {
    /// Returns the stored graph.
    #[must_use]
    #[rustfmt::skip]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Returns the name of the edit this snapshot brackets.
    #[must_use]
    #[rustfmt::skip]
    pub const fn label(&self) -> &'static str { self.label }

    /// Consumes the snapshot, returning the stored graph.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

/// Bounded undo and redo stacks of [`Snapshot`]s.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use equigraph_core::{Graph, History};
///
/// let mut history = History::new(NonZeroUsize::MIN);
/// let mut graph = Graph::new();
/// history.record(graph.clone(), "add_node");
/// graph.add_node()?;
///
/// let previous = history.undo(graph).expect("one edit recorded");
/// assert!(previous.graph().is_empty());
/// assert!(history.can_redo());
/// # Ok::<(), equigraph_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    depth: NonZeroUsize,
}

impl History {
    /// Creates an empty history keeping at most `depth` undo steps.
    #[must_use]
    pub fn new(depth: NonZeroUsize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            depth,
        }
    }

    /// Returns the maximum number of undo steps retained.
    #[must_use]
    #[rustfmt::skip]
    pub const fn depth(&self) -> NonZeroUsize { self.depth }

    /// Records `before`, the graph prior to the edit named `label`.
    ///
    /// Any redo entries are discarded and the oldest undo entry is dropped
    /// once the depth is exceeded.
    pub fn record(&mut self, before: Graph, label: &'static str) {
        self.future.clear();
        self.push_past(Snapshot {
            graph: before,
            label,
        });
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.depth.get() {
            self.past.pop_front();
        }
    }

    /// Returns the snapshot [`History::undo`] would restore.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        self.past.back()
    }

    /// Returns the snapshot [`History::redo`] would restore.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&Snapshot> {
        self.future.last()
    }

    /// Steps back one edit, parking `current` on the redo stack.
    ///
    /// Returns `None`, dropping nothing, when there is nothing to undo.
    pub fn undo(&mut self, current: Graph) -> Option<Snapshot> {
        let snapshot = self.past.pop_back()?;
        self.future.push(Snapshot {
            graph: current,
            label: snapshot.label,
        });
        Some(snapshot)
    }

    /// Re-applies the most recently undone edit, parking `current` on the
    /// undo stack.
    pub fn redo(&mut self, current: Graph) -> Option<Snapshot> {
        let snapshot = self.future.pop()?;
        self.push_past(Snapshot {
            graph: current,
            label: snapshot.label,
        });
        Some(snapshot)
    }

    /// Returns `true` when an edit can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Returns `true` when an undone edit can be re-applied.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Returns the number of undo entries.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Returns the number of redo entries.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
