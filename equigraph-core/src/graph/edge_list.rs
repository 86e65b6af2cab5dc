//! Parser for the compact `"1-2, 2-3, 5"` edge-list notation.
//!
//! Tokens are separated by commas or newlines. A token is either an edge
//! (`u-v` or `u:v`, whitespace allowed around the separator) or a bare node
//! id declaring an isolated node. Lines starting with `#` are ignored.

use thiserror::Error;

use super::NodeId;
use crate::error::define_error_codes;

/// Parsed edge-list text: declared nodes and raw endpoint pairs in input
/// order. Pairs are not validated against any graph.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeList {
    nodes: Vec<NodeId>,
    pairs: Vec<(NodeId, NodeId)>,
}

impl EdgeList {
    /// Returns the nodes declared by bare tokens.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the endpoint pairs in input order.
    #[must_use]
    #[rustfmt::skip]
    pub fn pairs(&self) -> &[(NodeId, NodeId)] { &self.pairs }

    /// Returns `true` when the text contained no edge tokens.
    #[must_use]
    #[rustfmt::skip]
    pub fn has_no_edges(&self) -> bool { self.pairs.is_empty() }
}

/// Errors raised while parsing edge-list text.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// A token matched neither `u-v`, `u:v` nor a bare id.
    #[error("invalid token {token:?} at position {position} (use \"u-v\")")]
    InvalidToken {
        /// The offending token, trimmed.
        token: String,
        /// Zero-based token index.
        position: usize,
    },
    /// A node id did not fit the id range.
    #[error("node id {token:?} is out of range")]
    IdOutOfRange {
        /// The digits that failed to convert.
        token: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`ParseError`] variants.
    enum ParseErrorCode for ParseError {
        /// A token matched neither `u-v`, `u:v` nor a bare id.
        InvalidToken => InvalidToken { .. } => "PARSE_INVALID_TOKEN",
        /// A node id did not fit the id range.
        IdOutOfRange => IdOutOfRange { .. } => "PARSE_ID_OUT_OF_RANGE",
    }
}

/// Parses edge-list text.
///
/// # Errors
/// Returns [`ParseError::InvalidToken`] for malformed tokens and
/// [`ParseError::IdOutOfRange`] for ids beyond `u32`.
///
/// # Examples
/// ```
/// use equigraph_core::{NodeId, parse_edge_list};
///
/// let list = parse_edge_list("1-2, 2:3\n4")?;
/// assert_eq!(list.pairs(), &[
///     (NodeId::new(1), NodeId::new(2)),
///     (NodeId::new(2), NodeId::new(3)),
/// ]);
/// assert_eq!(list.nodes().collect::<Vec<_>>(), vec![NodeId::new(4)]);
/// # Ok::<(), equigraph_core::ParseError>(())
/// ```
pub fn parse_edge_list(text: &str) -> Result<EdgeList, ParseError> {
    let mut list = EdgeList::default();
    let tokens = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    for (position, token) in tokens.enumerate() {
        match token.split_once(['-', ':']) {
            Some((left, right)) => {
                let u = parse_id(left.trim(), token, position)?;
                let v = parse_id(right.trim(), token, position)?;
                list.pairs.push((u, v));
            }
            None => list.nodes.push(parse_id(token, token, position)?),
        }
    }
    Ok(list)
}

fn parse_id(digits: &str, token: &str, position: usize) -> Result<NodeId, ParseError> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseError::InvalidToken {
            token: token.to_owned(),
            position,
        });
    }
    digits
        .parse::<u32>()
        .map(NodeId::new)
        .map_err(|_| ParseError::IdOutOfRange {
            token: digits.to_owned(),
        })
}
