//! Benchmark parameter types.

use std::fmt;

/// Parameters for a fixture graph benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct GraphBenchParams {
    /// Number of nodes.
    pub node_count: usize,
    /// Maximum degree `r`.
    pub max_degree: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},r={}", self.node_count, self.max_degree)
    }
}
