//! Property-based checks of the repair step on random degree-bounded graphs.

use proptest::{
    prelude::*,
    test_runner::{TestCaseError, TestCaseResult},
};

use super::{
    ClassIndex, Coloring, RepairOutcome, RunTermination, apply_repair_step, greedy_coloring,
    repair_until_equitable,
};
use crate::{
    graph::{Graph, NodeId},
    test_utils::suite_proptest_config,
};

/// Graph whose maximum degree is at most `bound`, with a proper greedy
/// coloring over `bound + 1` classes.
#[derive(Clone, Debug)]
struct RepairFixture {
    graph: Graph,
    coloring: Coloring,
}

fn bounded_graph(nodes: u32, bound: usize, mask: &[bool]) -> Graph {
    let mut graph = Graph::new();
    let ids = graph.add_nodes(nodes as usize).unwrap_or_default();
    let mut bits = mask.iter().copied();
    for (i, &u) in ids.iter().enumerate() {
        for &v in ids.iter().skip(i + 1) {
            let wanted = bits.next().unwrap_or(false);
            if wanted && graph.degree(u) < bound && graph.degree(v) < bound {
                let _ = graph.add_edge(u, v);
            }
        }
    }
    graph
}

fn fixture_strategy() -> impl Strategy<Value = RepairFixture> {
    (2_u32..=14, 1_usize..=4)
        .prop_flat_map(|(nodes, bound)| {
            let pairs = (nodes * (nodes - 1) / 2) as usize;
            (
                Just(nodes),
                Just(bound),
                proptest::collection::vec(prop::bool::weighted(0.3), pairs),
            )
        })
        .prop_filter_map("greedy coloring must succeed", |(nodes, bound, mask)| {
            let graph = bounded_graph(nodes, bound, &mask);
            let coloring = greedy_coloring(&graph, bound + 1).ok()?;
            Some(RepairFixture { graph, coloring })
        })
}

fn edgeless_strategy() -> impl Strategy<Value = (Graph, Coloring)> {
    (2_usize..=5)
        .prop_flat_map(|classes| {
            (
                Just(classes),
                proptest::collection::vec(0..classes, 1..=16),
            )
        })
        .prop_map(|(classes, assignment)| {
            let mut graph = Graph::new();
            let mut coloring = Coloring::new(classes);
            for class in assignment {
                if let Ok(node) = graph.add_node() {
                    let _ = coloring.assign(node, ClassIndex::new(class));
                }
            }
            (graph, coloring)
        })
}

fn squares(counts: &[usize]) -> usize {
    counts.iter().map(|size| size * size).sum()
}

fn check_single_step(fixture: &RepairFixture) -> TestCaseResult {
    let RepairFixture { graph, coloring } = fixture;
    let outcome = apply_repair_step(graph, coloring)
        .map_err(|err| TestCaseError::fail(format!("repair failed: {err}")))?;
    let step = match outcome {
        RepairOutcome::Applied(step) => step,
        RepairOutcome::PathBroken { position, .. } => {
            return Err(TestCaseError::fail(format!(
                "fresh path broke at position {position}"
            )));
        }
        _ => return Ok(()),
    };

    let before = coloring.class_counts();
    let after = step.coloring().class_counts();
    prop_assert_eq!(step.coloring().len(), coloring.len());
    prop_assert!(squares(&after) < squares(&before));
    prop_assert!(after.iter().max() <= before.iter().max());
    prop_assert!(after.iter().min() >= before.iter().min());
    prop_assert!(step.coloring().gap() <= coloring.gap());
    prop_assert_eq!(step.moves().len() + 1, step.path().len());
    prop_assert!(step.coloring().is_proper(graph), "repair introduced a conflict");

    let moved: Vec<NodeId> = step.moves().iter().map(|m| m.node).collect();
    for (node, class) in step.coloring().iter() {
        if !moved.contains(&node) {
            prop_assert_eq!(coloring.class_of(node), Some(class));
        }
    }
    Ok(())
}

fn check_run(fixture: &RepairFixture) -> TestCaseResult {
    let RepairFixture { graph, coloring } = fixture;
    let run = repair_until_equitable(graph, coloring, 64)
        .map_err(|err| TestCaseError::fail(format!("repair run failed: {err}")))?;
    match run.termination() {
        RunTermination::Equitable => prop_assert!(run.final_coloring().is_equitable()),
        RunTermination::Unreachable { .. } => {
            prop_assert!(!run.final_coloring().is_equitable());
        }
        other => return Err(TestCaseError::fail(format!("unexpected end: {other:?}"))),
    }
    prop_assert!(run.final_coloring().is_proper(graph));
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn repair_step_shrinks_the_size_spread(fixture in fixture_strategy()) {
        check_single_step(&fixture)?;
    }

    #[test]
    fn repair_runs_end_equitable_or_unreachable(fixture in fixture_strategy()) {
        check_run(&fixture)?;
    }

    #[test]
    fn edgeless_graphs_always_become_equitable((graph, coloring) in edgeless_strategy()) {
        let run = repair_until_equitable(&graph, &coloring, 64)
            .map_err(|err| TestCaseError::fail(format!("repair run failed: {err}")))?;
        prop_assert_eq!(run.termination(), &RunTermination::Equitable);
        prop_assert_eq!(run.final_coloring().len(), coloring.len());
    }
}
