//! Seeded graph fixtures.
//!
//! Every fixture starts from the `connected` template, so BFS queries always
//! find a path, and then adds seeded random chords up to the degree bound.

use equigraph_core::{NodeId, Session, SessionBuilder, Template};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{error::BenchSetupError, params::GraphBenchParams};

/// Builds a connected session respecting `params.max_degree`.
///
/// # Errors
/// Returns [`BenchSetupError`] when the session rejects the fixture, for
/// example when the bound is too low to connect the nodes.
///
/// # Examples
/// ```
/// use equigraph_benches::{fixtures::bounded_session, params::GraphBenchParams};
///
/// let params = GraphBenchParams { node_count: 20, max_degree: 3 };
/// let session = bounded_session(params, 7)?;
/// assert_eq!(session.graph().node_count(), 20);
/// # Ok::<(), equigraph_benches::error::BenchSetupError>(())
/// ```
pub fn bounded_session(params: GraphBenchParams, seed: u64) -> Result<Session, BenchSetupError> {
    if params.node_count < 2 {
        return Err(BenchSetupError::TooFewNodes {
            required: 2,
            got: params.node_count,
        });
    }
    let mut session = SessionBuilder::new()
        .with_max_degree(params.max_degree)
        .build()?;
    session.add_nodes(params.node_count)?;
    session.generate(Template::Connected)?;
    session.generate(Template::Random {
        count: params.node_count,
        seed,
    })?;
    Ok(session)
}

/// Same as [`bounded_session`] with the greedy coloring installed, which
/// leaves the low classes oversized and gives repair real work.
///
/// # Errors
/// Returns [`BenchSetupError`] when fixture construction or seeding fails.
pub fn greedy_session(params: GraphBenchParams, seed: u64) -> Result<Session, BenchSetupError> {
    let mut session = bounded_session(params, seed)?;
    session.seed_with_greedy()?;
    Ok(session)
}

/// Draws `count` distinct-endpoint BFS queries from the nodes of `session`.
#[must_use]
pub fn bfs_queries(session: &Session, count: usize, seed: u64) -> Vec<(NodeId, NodeId)> {
    let nodes: Vec<NodeId> = session.graph().nodes().collect();
    if nodes.len() < 2 {
        return Vec::new();
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut queries = Vec::with_capacity(count);
    while queries.len() < count {
        let start = nodes.get(rng.gen_range(0..nodes.len()));
        let end = nodes.get(rng.gen_range(0..nodes.len()));
        if let (Some(&start), Some(&end)) = (start, end)
            && start != end
        {
            queries.push((start, end));
        }
    }
    queries
}
