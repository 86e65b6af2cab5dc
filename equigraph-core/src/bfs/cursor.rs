//! Replay navigation over a finished trace.

use super::{BfsStep, BfsTrace};

/// Position within a [`BfsTrace`] supporting forward, backward and random
/// access.
///
/// Movement never recomputes anything; it only changes which snapshot is
/// current.
///
/// # Examples
/// ```
/// use equigraph_core::{Graph, run_bfs};
///
/// let mut graph = Graph::new();
/// let ids = graph.add_nodes(2)?;
/// graph.add_edge(ids[0], ids[1])?;
/// let trace = run_bfs(&graph, ids[0], ids[1])?;
///
/// let mut cursor = trace.cursor();
/// let first = cursor.current().cloned();
/// while cursor.advance().is_some() {}
/// assert!(cursor.is_at_end());
/// cursor.reset();
/// assert_eq!(cursor.current().cloned(), first);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BfsCursor<'a> {
    trace: &'a BfsTrace,
    position: usize,
}

impl<'a> BfsCursor<'a> {
    pub(super) const fn new(trace: &'a BfsTrace) -> Self {
        Self { trace, position: 0 }
    }

    /// Returns the current position.
    #[must_use]
    #[rustfmt::skip]
    pub const fn position(&self) -> usize { self.position }

    /// Returns the snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&'a BfsStep> {
        self.trace.step(self.position)
    }

    /// Moves one step forward. Returns `None` at the last step.
    pub fn advance(&mut self) -> Option<&'a BfsStep> {
        let next = self.position.checked_add(1)?;
        let step = self.trace.step(next)?;
        self.position = next;
        Some(step)
    }

    /// Moves one step back. Returns `None` at the first step.
    pub fn retreat(&mut self) -> Option<&'a BfsStep> {
        let previous = self.position.checked_sub(1)?;
        let step = self.trace.step(previous)?;
        self.position = previous;
        Some(step)
    }

    /// Jumps to `index`. Returns `None` and stays put when out of range.
    pub fn seek(&mut self, index: usize) -> Option<&'a BfsStep> {
        let step = self.trace.step(index)?;
        self.position = index;
        Some(step)
    }

    /// Returns to the first step.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Returns `true` when positioned on the terminal step.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position.saturating_add(1) >= self.trace.len()
    }
}
