//! Error types for the equigraph core library.
//!
//! Each engine module owns a focused error enum; [`SessionError`] aggregates
//! them for the stateful [`crate::Session`] surface. Every enum exposes a
//! stable machine-readable code so front ends can map failures to banners
//! without parsing display strings.

use std::fmt;

use thiserror::Error;

use crate::{
    bfs::BfsError,
    coloring::ColoringError,
    graph::{GenerateError, GraphError, NodeId, ParseError},
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident
                    $( { $($pattern:tt)* } )?
                    $( ( $($tuple:tt)* ) )?
                    => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(
                        Self::$ErrVariant
                            $( { $($pattern)* } )?
                            $( ( $($tuple)* ) )?
                            => $CodeTy::$CodeVariant,
                    )+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Operation that needs a degree bound before it can run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundedOperation {
    /// Resolving the current coloring.
    Coloring,
    /// Installing an explicit coloring.
    SetColoring,
    /// Building the auxiliary digraph.
    AuxDigraph,
    /// Running the equitable repair step.
    Repair,
}

impl fmt::Display for BoundedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Coloring => "coloring",
            Self::SetColoring => "set_coloring",
            Self::AuxDigraph => "aux_digraph",
            Self::Repair => "repair",
        })
    }
}

/// Error type produced by [`crate::Session`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    /// A structural graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A graph generator rejected the request.
    #[error(transparent)]
    Generate(#[from] GenerateError),
    /// Edge-list text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A BFS query failed validation.
    #[error(transparent)]
    Bfs(#[from] BfsError),
    /// A coloring operation failed.
    #[error(transparent)]
    Coloring(#[from] ColoringError),
    /// Adding an edge would push a node above the enforced degree bound.
    #[error("node {node} already has the maximum degree of {bound}")]
    DegreeBoundExceeded {
        /// Endpoint whose degree is saturated.
        node: NodeId,
        /// Enforced maximum degree.
        bound: usize,
    },
    /// The requested degree bound is lower than a degree already present.
    #[error("node {node} has degree {degree}, which exceeds the requested bound {bound}")]
    DegreeBoundViolated {
        /// First node (lowest id) whose degree is too large.
        node: NodeId,
        /// Current degree of that node.
        degree: usize,
        /// Requested maximum degree.
        bound: usize,
    },
    /// The operation requires a degree bound but none is configured.
    #[error("`{operation}` requires a maximum degree to be set")]
    DegreeBoundRequired {
        /// Operation that was attempted.
        operation: BoundedOperation,
    },
    /// Bulk edge application needs more nodes than the graph holds.
    #[error("at least {required} nodes are required but the graph has {got}")]
    InsufficientNodes {
        /// Minimum number of nodes.
        required: usize,
        /// Nodes currently present.
        got: usize,
    },
    /// Bulk edge text contained no edges.
    #[error("edge list contains no edges")]
    EmptyEdgeList,
    /// Bulk edge application would leave a node without edges.
    #[error("every node must have at least one edge; node {node} has none")]
    IsolatedNode {
        /// The node left without an incident edge.
        node: NodeId,
    },
    /// The configured history depth was zero.
    #[error("history depth must be at least 1")]
    ZeroHistoryDepth,
}

define_error_codes! {
    /// Stable codes describing [`SessionError`] variants.
    enum SessionErrorCode for SessionError {
        /// A structural graph operation failed.
        Graph => Graph(_) => "SESSION_GRAPH",
        /// A graph generator rejected the request.
        Generate => Generate(_) => "SESSION_GENERATE",
        /// Edge-list text could not be parsed.
        Parse => Parse(_) => "SESSION_PARSE",
        /// A BFS query failed validation.
        Bfs => Bfs(_) => "SESSION_BFS",
        /// A coloring operation failed.
        Coloring => Coloring(_) => "SESSION_COLORING",
        /// Adding an edge would exceed the degree bound.
        DegreeBoundExceeded => DegreeBoundExceeded { .. } => "SESSION_DEGREE_BOUND_EXCEEDED",
        /// The requested bound is below an existing degree.
        DegreeBoundViolated => DegreeBoundViolated { .. } => "SESSION_DEGREE_BOUND_VIOLATED",
        /// A degree bound is required.
        DegreeBoundRequired => DegreeBoundRequired { .. } => "SESSION_DEGREE_BOUND_REQUIRED",
        /// Too few nodes for the operation.
        InsufficientNodes => InsufficientNodes { .. } => "SESSION_INSUFFICIENT_NODES",
        /// Bulk edge text contained no edges.
        EmptyEdgeList => EmptyEdgeList => "SESSION_EMPTY_EDGE_LIST",
        /// A node would be left isolated.
        IsolatedNode => IsolatedNode { .. } => "SESSION_ISOLATED_NODE",
        /// History depth was zero.
        ZeroHistoryDepth => ZeroHistoryDepth => "SESSION_ZERO_HISTORY_DEPTH",
    }
}

impl SessionError {
    /// Returns the code of the wrapped module error, when there is one.
    #[must_use]
    pub fn inner_code(&self) -> Option<&'static str> {
        match self {
            Self::Graph(err) => Some(err.code().as_str()),
            Self::Generate(err) => Some(err.code().as_str()),
            Self::Parse(err) => Some(err.code().as_str()),
            Self::Bfs(err) => Some(err.code().as_str()),
            Self::Coloring(err) => Some(err.code().as_str()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by [`crate::Session`].
pub type Result<T> = core::result::Result<T, SessionError>;
