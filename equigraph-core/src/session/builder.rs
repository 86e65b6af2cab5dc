//! Builder for configuring [`Session`] instances.
//!
//! Collects the optional degree bound, the undo depth and an initial graph,
//! validating them together before a session is constructed.

use std::num::NonZeroUsize;

use super::{Session, check_bound};
use crate::{
    Result,
    error::SessionError,
    graph::{DegreeBound, Graph},
    history::History,
};

/// Undo depth used when [`SessionBuilder::with_history_depth`] is not called.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Configures and constructs [`Session`] instances.
///
/// # Examples
/// ```
/// use equigraph_core::SessionBuilder;
///
/// let session = SessionBuilder::new()
///     .with_max_degree(3)
///     .with_history_depth(10)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(session.degree_bound().map(|bound| bound.get()), Some(3));
/// assert_eq!(session.history().depth().get(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct SessionBuilder {
    max_degree: Option<usize>,
    history_depth: usize,
    graph: Graph,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            max_degree: None,
            history_depth: DEFAULT_HISTORY_DEPTH,
            graph: Graph::new(),
        }
    }
}

impl SessionBuilder {
    /// Creates a builder with no degree bound, an empty graph and the
    /// default history depth.
    ///
    /// # Examples
    /// ```
    /// use equigraph_core::{DEFAULT_HISTORY_DEPTH, SessionBuilder};
    ///
    /// let builder = SessionBuilder::new();
    /// assert_eq!(builder.max_degree(), None);
    /// assert_eq!(builder.history_depth(), DEFAULT_HISTORY_DEPTH);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforces a maximum degree `r`, giving `r + 1` color classes.
    #[must_use]
    pub fn with_max_degree(mut self, r: usize) -> Self {
        self.max_degree = Some(r);
        self
    }

    /// Returns the configured maximum degree.
    #[must_use]
    pub fn max_degree(&self) -> Option<usize> {
        self.max_degree
    }

    /// Overrides how many edits can be undone.
    #[must_use]
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    /// Returns the configured history depth.
    #[must_use]
    pub fn history_depth(&self) -> usize {
        self.history_depth
    }

    /// Starts the session from `graph` instead of an empty graph.
    ///
    /// # Examples
    /// ```
    /// use equigraph_core::{SessionBuilder, example_graph};
    ///
    /// let session = SessionBuilder::new()
    ///     .with_graph(example_graph())
    ///     .build()
    ///     .expect("no bound to violate");
    /// assert_eq!(session.graph().node_count(), 16);
    /// assert!(!session.history().can_undo());
    /// ```
    #[must_use]
    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = graph;
        self
    }

    /// Validates the configuration and constructs a [`Session`].
    ///
    /// # Errors
    /// Returns [`SessionError::ZeroHistoryDepth`] for a depth of zero and
    /// [`SessionError::DegreeBoundViolated`] when the initial graph already
    /// exceeds the bound.
    ///
    /// # Examples
    /// ```
    /// use equigraph_core::{SessionBuilder, SessionError};
    ///
    /// let err = SessionBuilder::new().with_history_depth(0).build().unwrap_err();
    /// assert_eq!(err, SessionError::ZeroHistoryDepth);
    /// ```
    pub fn build(self) -> Result<Session> {
        let depth =
            NonZeroUsize::new(self.history_depth).ok_or(SessionError::ZeroHistoryDepth)?;
        let degree_bound = self.max_degree.map(DegreeBound::new);
        check_bound(&self.graph, degree_bound)?;
        Ok(Session::from_parts(
            self.graph,
            degree_bound,
            History::new(depth),
        ))
    }
}
