//! Tests for the structured edge-set generators.

use proptest::{prelude::*, test_runner::TestCaseResult};
use rstest::rstest;
use test_strategy::Arbitrary;

use super::*;
use crate::test_utils::suite_proptest_config;

fn nodes(count: usize) -> Graph {
    let mut graph = Graph::new();
    graph.add_nodes(count).expect("ids available");
    graph
}

fn bound(r: usize) -> Option<DegreeBound> {
    Some(DegreeBound::new(r))
}

fn max_degree_of(graph: &Graph, edges: &[Edge]) -> usize {
    let mut candidate = graph.clone();
    candidate.replace_edges(edges).expect("generated edges are valid");
    candidate.max_degree()
}

#[rstest]
#[case(Template::Complete, 4, None, 6)]
#[case(Template::Complete, 4, bound(3), 6)]
#[case(Template::Cycle, 5, bound(2), 5)]
#[case(Template::Star, 5, None, 4)]
fn structured_templates_produce_expected_edge_counts(
    #[case] template: Template,
    #[case] count: usize,
    #[case] limit: Option<DegreeBound>,
    #[case] expected: usize,
) {
    let graph = nodes(count);
    let edges = generate(&graph, template, limit).expect("template fits");
    assert_eq!(edges.len(), expected);
    let mut built = graph.clone();
    built.replace_edges(&edges).expect("edges are valid");
    assert_eq!(built.connected_components().len(), 1);
}

#[rstest]
#[case(Template::Complete, 1, None, GenerateErrorCode::NotEnoughNodes)]
#[case(Template::Complete, 4, bound(2), GenerateErrorCode::DegreeBoundTooLow)]
#[case(Template::Cycle, 2, None, GenerateErrorCode::NotEnoughNodes)]
#[case(Template::Cycle, 4, bound(1), GenerateErrorCode::DegreeBoundTooLow)]
#[case(Template::Star, 5, bound(3), GenerateErrorCode::DegreeBoundTooLow)]
#[case(Template::Connected, 3, None, GenerateErrorCode::DegreeBoundRequired)]
#[case(Template::Connected, 3, bound(1), GenerateErrorCode::CannotConnect)]
#[case(Template::Connected, 2, bound(0), GenerateErrorCode::CannotConnect)]
#[case(Template::ConflictProne, 4, bound(0), GenerateErrorCode::DegreeBoundTooLow)]
#[case(Template::Random { count: 0, seed: 1 }, 3, None, GenerateErrorCode::InvalidEdgeCount)]
fn impossible_requests_are_rejected(
    #[case] template: Template,
    #[case] count: usize,
    #[case] limit: Option<DegreeBound>,
    #[case] expected: GenerateErrorCode,
) {
    let err = generate(&nodes(count), template, limit).expect_err("request is impossible");
    assert_eq!(err.code(), expected);
}

#[rstest]
fn connected_with_degree_one_reports_node_limit() {
    let err = generate(&nodes(3), Template::Connected, bound(1)).expect_err("impossible");
    assert_eq!(
        err.to_string(),
        "impossible: a connected graph with max degree 1 needs n <= 2 (got 3)"
    );
}

#[rstest]
fn star_centre_is_lowest_id() {
    let graph = Graph::with_nodes([NodeId::new(9), NodeId::new(3), NodeId::new(5)])
        .expect("distinct ids");
    let edges = generate(&graph, Template::Star, None).expect("star fits");
    assert!(edges.iter().all(|edge| edge.a() == NodeId::new(3)));
}

#[rstest]
#[case(2, 1)]
#[case(6, 2)]
#[case(9, 3)]
fn connected_respects_bound_and_connects(#[case] count: usize, #[case] r: usize) {
    let graph = nodes(count);
    let edges = generate(&graph, Template::Connected, bound(r)).expect("connectable");
    let mut built = graph.clone();
    built.replace_edges(&edges).expect("edges are valid");
    assert!(built.max_degree() <= r);
    assert_eq!(built.connected_components().len(), 1);
}

#[rstest]
#[case(7, 2)]
#[case(10, 3)]
#[case(6, 1)]
fn conflict_prone_keeps_every_node_covered(#[case] count: usize, #[case] r: usize) {
    let graph = nodes(count);
    let edges = generate(&graph, Template::ConflictProne, bound(r)).expect("buildable");
    assert!(max_degree_of(&graph, &edges) <= r);
    for node in graph.nodes() {
        assert!(
            edges.iter().any(|edge| edge.touches(node)),
            "node {node} left isolated"
        );
    }
}

#[rstest]
fn conflict_prone_favours_same_class_edges() {
    let graph = nodes(9);
    let edges = generate(&graph, Template::ConflictProne, bound(2)).expect("buildable");
    let k = 3;
    let monochrome = edges
        .iter()
        .filter(|edge| seed_class(edge.a(), k) == seed_class(edge.b(), k))
        .count();
    assert!(monochrome > 0, "seed coloring should have conflicts");
}

#[rstest]
fn conflict_prone_reports_unplaceable_node() {
    // Classes {1,3,5} and {2,4}: chains saturate 1, 3, 2 and 4 under r = 1,
    // leaving node 5 with no partner.
    let err = generate(&nodes(5), Template::ConflictProne, bound(1)).expect_err("stuck");
    assert_eq!(
        err,
        GenerateError::PlacementFailed {
            node: NodeId::new(5),
            bound: 1,
        }
    );
}

#[rstest]
fn random_keeps_existing_edges_and_is_seeded() {
    let mut graph = nodes(6);
    graph.add_edge(NodeId::new(1), NodeId::new(2)).expect("edge");
    let template = Template::Random { count: 4, seed: 42 };
    let first = generate(&graph, template, bound(3)).expect("room for edges");
    let second = generate(&graph, template, bound(3)).expect("room for edges");
    assert_eq!(first, second);
    assert_eq!(first.first(), graph.edges().first());
    assert!(first.len() > 1 && first.len() <= 5);
    assert!(max_degree_of(&graph, &first) <= 3);
}

#[rstest]
fn random_on_complete_graph_is_saturated() {
    let graph = nodes(3);
    let edges = generate(&graph, Template::Complete, None).expect("complete");
    let mut full = graph.clone();
    full.replace_edges(&edges).expect("valid");
    let err = generate(&full, Template::Random { count: 1, seed: 0 }, None)
        .expect_err("no pairs left");
    assert_eq!(err, GenerateError::GraphSaturated);
}

#[rstest]
fn example_graph_has_expected_shape() {
    let graph = example_graph();
    assert_eq!(graph.node_count(), 16);
    assert_eq!(graph.edge_count(), 23);
    assert_eq!(graph.max_degree(), 4);
    assert!(graph.contains_node(NodeId::new(0)));
    assert!(graph.contains_node(EXAMPLE_START) && graph.contains_node(EXAMPLE_END));
    assert_eq!(graph.connected_components().len(), 1);
}

/// Template shape drawn by the property below; `Random` takes its
/// parameters from the test inputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum TemplateKind {
    Complete,
    Cycle,
    Star,
    #[weight(2)]
    Connected,
    #[weight(2)]
    ConflictProne,
    #[weight(2)]
    Random,
}

impl TemplateKind {
    const fn template(self, count: usize, seed: u64) -> Template {
        match self {
            Self::Complete => Template::Complete,
            Self::Cycle => Template::Cycle,
            Self::Star => Template::Star,
            Self::Connected => Template::Connected,
            Self::ConflictProne => Template::ConflictProne,
            Self::Random => Template::Random { count, seed },
        }
    }
}

fn check_generated_within_bound(
    kind: TemplateKind,
    node_count: usize,
    r: usize,
    seed: u64,
) -> TestCaseResult {
    let graph = nodes(node_count);
    let template = kind.template(node_count, seed);
    let Ok(edges) = generate(&graph, template, bound(r)) else {
        return Ok(());
    };
    let mut built = graph.clone();
    let replaced = built.replace_edges(&edges);
    prop_assert!(replaced.is_ok(), "{template:?} produced invalid edges");
    prop_assert!(built.max_degree() <= r, "{template:?} broke r = {r}");
    prop_assert_eq!(built.node_count(), node_count);
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn generated_edges_respect_the_bound(
        kind in any::<TemplateKind>(),
        node_count in 2_usize..=12,
        r in 0_usize..=4,
        seed in any::<u64>(),
    ) {
        check_generated_within_bound(kind, node_count, r, seed)?;
    }
}
