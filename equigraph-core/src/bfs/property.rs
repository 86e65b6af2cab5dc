//! Property-based checks of BFS traces against an independent distance
//! oracle.

use std::collections::{BTreeMap, VecDeque};

use proptest::{
    prelude::*,
    test_runner::{TestCaseError, TestCaseResult},
};

use super::{BfsAction, run_bfs};
use crate::{
    graph::{Graph, NodeId},
    test_utils::suite_proptest_config,
};

/// Random simple graph plus a query pair drawn from its node ids.
#[derive(Clone, Debug)]
struct BfsFixture {
    graph: Graph,
    start: NodeId,
    end: NodeId,
}

fn fixture_strategy() -> impl Strategy<Value = BfsFixture> {
    (1_u32..=12)
        .prop_flat_map(|nodes| {
            let pairs = (nodes * nodes.saturating_sub(1) / 2) as usize;
            (
                Just(nodes),
                proptest::collection::vec(any::<bool>(), pairs),
                0..nodes,
                0..nodes,
            )
        })
        .prop_map(|(nodes, mask, start, end)| {
            let mut graph = Graph::new();
            let ids = graph.add_nodes(nodes as usize).unwrap_or_default();
            let mut bits = mask.into_iter();
            for (i, &u) in ids.iter().enumerate() {
                for &v in ids.iter().skip(i + 1) {
                    if bits.next().unwrap_or(false) {
                        let _ = graph.add_edge(u, v);
                    }
                }
            }
            BfsFixture {
                graph,
                start: NodeId::new(start + 1),
                end: NodeId::new(end + 1),
            }
        })
}

fn oracle_distances(graph: &Graph, start: NodeId) -> BTreeMap<NodeId, usize> {
    let adjacency = graph.adjacency();
    let mut distance = BTreeMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let next = distance.get(&node).copied().unwrap_or(0) + 1;
        for &neighbour in adjacency.neighbours(node) {
            if !distance.contains_key(&neighbour) {
                distance.insert(neighbour, next);
                queue.push_back(neighbour);
            }
        }
    }
    distance
}

fn check_trace(fixture: &BfsFixture) -> TestCaseResult {
    let trace = run_bfs(&fixture.graph, fixture.start, fixture.end)
        .map_err(|err| TestCaseError::fail(format!("run_bfs failed: {err}")))?;
    let oracle = oracle_distances(&fixture.graph, fixture.start);
    let last = trace
        .last()
        .ok_or_else(|| TestCaseError::fail("trace is empty"))?;

    for (node, hops) in &last.distance {
        prop_assert_eq!(oracle.get(node), Some(hops), "distance mismatch at {}", node);
    }

    match oracle.get(&fixture.end) {
        Some(&expected) => {
            let path = trace
                .final_path()
                .ok_or_else(|| TestCaseError::fail("reachable target without a path"))?;
            prop_assert_eq!(path.len(), expected + 1);
            prop_assert_eq!(path.first(), Some(&fixture.start));
            prop_assert_eq!(path.last(), Some(&fixture.end));
            for hop in path.windows(2) {
                if let [u, v] = hop {
                    prop_assert!(fixture.graph.contains_edge(*u, *v), "{}-{} is not an edge", u, v);
                }
            }
        }
        None => {
            let terminal = trace
                .steps()
                .iter()
                .filter(|step| step.action == BfsAction::NotFound)
                .count();
            prop_assert_eq!(terminal, 1);
            prop_assert_eq!(last.action, BfsAction::NotFound);
            prop_assert!(!last.distance.contains_key(&fixture.end));
            prop_assert!(last.distance.keys().all(|node| oracle.contains_key(node)));
        }
    }

    let bound = 2 + fixture.graph.edge_count() * 2 + fixture.graph.node_count() * 2;
    prop_assert!(trace.len() <= bound, "trace of {} steps exceeds {}", trace.len(), bound);
    Ok(())
}

fn check_replay(fixture: &BfsFixture) -> TestCaseResult {
    let trace = run_bfs(&fixture.graph, fixture.start, fixture.end)
        .map_err(|err| TestCaseError::fail(format!("run_bfs failed: {err}")))?;
    let mut cursor = trace.cursor();
    let mut forward = Vec::new();
    forward.push(cursor.current().cloned());
    while let Some(step) = cursor.advance() {
        forward.push(Some(step.clone()));
    }
    let mut backward = vec![cursor.current().cloned()];
    while let Some(step) = cursor.retreat() {
        backward.push(Some(step.clone()));
    }
    backward.reverse();
    prop_assert_eq!(&forward, &backward);
    for index in 0..trace.len() {
        prop_assert_eq!(trace.step(index), trace.step(index));
        prop_assert_eq!(trace.step(index).map(|step| step.step_index), Some(index));
    }
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(256))]

    #[test]
    fn bfs_matches_distance_oracle(fixture in fixture_strategy()) {
        check_trace(&fixture)?;
    }

    #[test]
    fn bfs_replay_is_idempotent(fixture in fixture_strategy()) {
        check_replay(&fixture)?;
    }
}
