//! Unit tests for the session surface and its builder.

use rstest::{fixture, rstest};

use super::*;
use crate::{
    coloring::seed_class,
    error::SessionErrorCode,
    graph::{GenerateError, ParseError},
};

fn id(raw: u32) -> NodeId {
    NodeId::new(raw)
}

fn class(raw: usize) -> ClassIndex {
    ClassIndex::new(raw)
}

fn session_with(nodes: usize, bound: Option<usize>) -> Session {
    let mut builder = SessionBuilder::new();
    if let Some(r) = bound {
        builder = builder.with_max_degree(r);
    }
    let mut session = builder.build().expect("valid configuration");
    session.add_nodes(nodes).expect("small graph");
    session
}

/// Four nodes under a degree bound of two.
#[fixture]
fn bounded() -> Session {
    session_with(4, Some(2))
}

#[rstest]
fn add_edge_rejects_saturated_endpoint(mut bounded: Session) {
    bounded.add_edge(id(1), id(2)).expect("fresh edge");
    bounded.add_edge(id(1), id(3)).expect("fresh edge");
    let undo_len = bounded.history().undo_len();
    let before = bounded.graph().clone();

    let err = bounded.add_edge(id(1), id(4)).expect_err("node 1 saturated");
    assert_eq!(
        err,
        SessionError::DegreeBoundExceeded {
            node: id(1),
            bound: 2,
        }
    );
    assert_eq!(err.code(), SessionErrorCode::DegreeBoundExceeded);
    assert_eq!(bounded.graph(), &before);
    assert_eq!(bounded.history().undo_len(), undo_len);
}

#[rstest]
fn structural_failures_pass_through(mut bounded: Session) {
    let err = bounded.add_edge(id(2), id(2)).expect_err("self-loop");
    assert_eq!(err, SessionError::Graph(GraphError::SelfLoop { node: id(2) }));
    assert_eq!(err.inner_code(), Some("GRAPH_SELF_LOOP"));
    let err = bounded.add_edge(id(2), id(9)).expect_err("unknown node");
    assert_eq!(err, SessionError::Graph(GraphError::NodeNotFound { node: id(9) }));
}

#[rstest]
fn no_op_removals_record_nothing(mut bounded: Session) {
    let undo_len = bounded.history().undo_len();
    assert!(!bounded.remove_node(id(40)));
    assert!(!bounded.remove_edge(id(1), id(2)));
    assert_eq!(bounded.history().undo_len(), undo_len);
}

#[rstest]
fn edge_list_replaces_edges_and_collapses_duplicates(mut bounded: Session) {
    bounded.add_edge(id(1), id(4)).expect("fresh edge");
    let added = bounded
        .apply_edge_list("1-2, 2:1, 3-4\n# trailing comment\n2-3")
        .expect("valid list");
    assert_eq!(added, 3);
    assert!(!bounded.graph().contains_edge(id(1), id(4)));
    assert!(bounded.graph().contains_edge(id(1), id(2)));
    assert_eq!(bounded.graph().edge_count(), 3);
    assert_eq!(
        bounded.history().peek_undo().map(|snapshot| snapshot.label()),
        Some("apply_edge_list")
    );
}

#[rstest]
#[case("1-2, 2-3", SessionError::IsolatedNode { node: NodeId::new(4) })]
#[case(
    "1-2, 1-3, 1-4",
    SessionError::DegreeBoundViolated { node: NodeId::new(1), degree: 3, bound: 2 }
)]
#[case("", SessionError::EmptyEdgeList)]
#[case("1, 2", SessionError::EmptyEdgeList)]
#[case("1-9", SessionError::Graph(GraphError::NodeNotFound { node: NodeId::new(9) }))]
#[case("7, 1-2", SessionError::Graph(GraphError::NodeNotFound { node: NodeId::new(7) }))]
#[case("1-1, 2-3", SessionError::Graph(GraphError::SelfLoop { node: NodeId::new(1) }))]
#[case(
    "1-x",
    SessionError::Parse(ParseError::InvalidToken { token: "1-x".to_owned(), position: 0 })
)]
fn edge_list_failures_leave_graph_untouched(
    mut bounded: Session,
    #[case] text: &str,
    #[case] expected: SessionError,
) {
    bounded.add_edge(id(1), id(2)).expect("fresh edge");
    let before = bounded.graph().clone();
    let err = bounded.apply_edge_list(text).expect_err("rejected list");
    assert_eq!(err, expected);
    assert_eq!(bounded.graph(), &before);
}

#[rstest]
fn edge_list_needs_two_nodes() {
    let mut session = session_with(1, None);
    let err = session.apply_edge_list("1-2").expect_err("one node");
    assert_eq!(err, SessionError::InsufficientNodes { required: 2, got: 1 });
}

#[rstest]
fn unbounded_edge_list_allows_isolated_nodes() {
    let mut session = session_with(4, None);
    assert_eq!(session.apply_edge_list("1-2, 1-3, 1-4, 2-3"), Ok(4));
    assert_eq!(session.graph().degree(id(1)), 3);
}

#[rstest]
fn negative_bound_is_rejected(mut bounded: Session) {
    let err = bounded.set_max_degree(-1).expect_err("negative");
    assert_eq!(
        err,
        SessionError::Graph(GraphError::NegativeDegreeBound { got: -1 })
    );
    assert_eq!(bounded.degree_bound(), Some(DegreeBound::new(2)));
}

#[rstest]
fn bound_below_existing_degree_is_rejected(mut bounded: Session) {
    bounded.add_edge(id(3), id(1)).expect("fresh edge");
    bounded.add_edge(id(3), id(2)).expect("fresh edge");
    let err = bounded.set_max_degree(1).expect_err("node 3 has degree 2");
    assert_eq!(
        err,
        SessionError::DegreeBoundViolated {
            node: id(3),
            degree: 2,
            bound: 1,
        }
    );
    assert_eq!(bounded.degree_bound(), Some(DegreeBound::new(2)));
}

#[rstest]
fn coloring_requires_a_bound() {
    let mut session = session_with(3, None);
    assert_eq!(
        session.coloring(),
        Err(SessionError::DegreeBoundRequired {
            operation: BoundedOperation::Coloring,
        })
    );
    assert_eq!(
        session.aux_digraph().map(|_| ()),
        Err(SessionError::DegreeBoundRequired {
            operation: BoundedOperation::AuxDigraph,
        })
    );
    assert_eq!(
        session.repair_step().map(|_| ()),
        Err(SessionError::DegreeBoundRequired {
            operation: BoundedOperation::Repair,
        })
    );
    let coloring = Coloring::new(2);
    assert_eq!(
        session.set_coloring(&coloring),
        Err(SessionError::DegreeBoundRequired {
            operation: BoundedOperation::SetColoring,
        })
    );
}

#[rstest]
fn overrides_apply_to_present_nodes_only() {
    let mut session = session_with(3, Some(1));
    assert_eq!(session.class_counts(), Ok(vec![2, 1]));

    let explicit = Coloring::from_assignments(2, [(id(1), class(1))]).expect("in range");
    session.set_coloring(&explicit).expect("matching classes");
    assert_eq!(session.coloring().map(|c| c.class_of(id(1))), Ok(Some(class(1))));
    assert_eq!(session.class_counts(), Ok(vec![1, 2]));

    assert!(session.remove_node(id(1)));
    assert_eq!(session.class_counts(), Ok(vec![1, 1]));

    session.set_max_degree(1).expect("same bound");
    assert!(session.undo().expect("no bound conflict").is_some());
    assert_eq!(session.class_counts(), Ok(vec![2, 1]), "overrides were cleared");
}

#[rstest]
fn reused_id_after_removal_starts_from_seed() {
    let mut session = session_with(3, Some(2));
    let explicit = Coloring::from_assignments(3, [(id(3), class(0))]).expect("in range");
    session.set_coloring(&explicit).expect("matching classes");
    assert!(session.remove_node(id(3)));

    assert_eq!(session.add_node(), Ok(id(3)));
    let coloring = session.coloring().expect("bounded");
    assert_eq!(coloring.class_of(id(3)), Some(seed_class(id(3), 3)));
    assert_eq!(coloring.class_of(id(3)), Some(class(2)));
}

#[rstest]
fn undo_dropping_a_node_forgets_its_override() {
    let mut session = session_with(2, Some(1));
    assert_eq!(session.add_node(), Ok(id(3)));
    let explicit = Coloring::from_assignments(2, [(id(3), class(1))]).expect("in range");
    session.set_coloring(&explicit).expect("matching classes");

    assert_eq!(session.undo(), Ok(Some("add_node")));
    assert_eq!(session.add_node(), Ok(id(3)));
    assert_eq!(
        session.coloring().map(|c| c.class_of(id(3))),
        Ok(Some(seed_class(id(3), 2)))
    );
}

#[rstest]
fn set_coloring_checks_class_count_and_nodes(mut bounded: Session) {
    let err = bounded
        .set_coloring(&Coloring::new(2))
        .expect_err("r = 2 needs three classes");
    assert_eq!(
        err,
        SessionError::Coloring(ColoringError::ClassCountMismatch {
            expected: 3,
            got: 2,
        })
    );
    let stray = Coloring::from_assignments(3, [(id(8), class(0))]).expect("in range");
    let err = bounded.set_coloring(&stray).expect_err("node 8 unknown");
    assert_eq!(
        err,
        SessionError::Coloring(ColoringError::UnknownNode { node: id(8) })
    );
}

#[rstest]
fn greedy_seed_is_proper(mut bounded: Session) {
    bounded
        .apply_edge_list("1-2, 2-3, 3-4, 4-1")
        .expect("a 4-cycle fits r = 2");
    assert!(!bounded.coloring().expect("bounded").is_proper(bounded.graph()));
    let greedy = bounded.seed_with_greedy().expect("three classes suffice");
    assert!(greedy.is_proper(bounded.graph()));
    assert_eq!(bounded.coloring(), Ok(greedy));
}

#[rstest]
fn repair_steps_are_stored() {
    let mut session = session_with(7, Some(3));
    let lopsided = Coloring::from_assignments(
        4,
        [
            (id(1), class(0)),
            (id(2), class(0)),
            (id(3), class(0)),
            (id(4), class(0)),
            (id(5), class(1)),
            (id(6), class(2)),
            (id(7), class(3)),
        ],
    )
    .expect("in range");
    session.set_coloring(&lopsided).expect("matching classes");

    let outcome = session.repair_step().expect("valid input");
    assert!(outcome.is_applied());
    assert_eq!(session.class_counts(), Ok(vec![3, 2, 1, 1]));

    let run = session.repair_until_equitable(10).expect("valid input");
    assert!(run.is_equitable());
    assert_eq!(session.class_counts(), Ok(vec![2, 2, 2, 1]));
    assert_eq!(session.is_equitable(), Ok(true));
    assert_eq!(
        session.repair_step(),
        Ok(RepairOutcome::AlreadyEquitable)
    );
}

#[rstest]
fn undo_and_redo_walk_the_history() {
    let mut session = session_with(3, None);
    session.add_edge(id(1), id(2)).expect("fresh edge");
    session.clear_edges();

    assert_eq!(session.undo(), Ok(Some("clear_edges")));
    assert_eq!(session.graph().edge_count(), 1);
    assert_eq!(session.undo(), Ok(Some("add_edge")));
    assert_eq!(session.undo(), Ok(Some("add_nodes")));
    assert!(session.graph().is_empty());
    assert_eq!(session.undo(), Ok(None));

    assert_eq!(session.redo(), Ok(Some("add_nodes")));
    assert_eq!(session.graph().node_count(), 3);
    session.insert_node(id(10)).expect("free id");
    assert_eq!(session.redo(), Ok(None), "new edits drop redo");
}

#[rstest]
fn undo_refuses_graphs_over_the_bound() {
    let mut session = session_with(3, None);
    session.add_edge(id(1), id(2)).expect("fresh edge");
    session.add_edge(id(1), id(3)).expect("fresh edge");
    assert!(session.remove_edge(id(1), id(3)));
    session.set_max_degree(1).expect("degrees are at most 1");

    let before = session.graph().clone();
    let err = session.undo().expect_err("restoring 1-3 breaks r = 1");
    assert_eq!(
        err,
        SessionError::DegreeBoundViolated {
            node: id(1),
            degree: 2,
            bound: 1,
        }
    );
    assert_eq!(session.graph(), &before);
    assert!(session.history().can_undo());
}

#[rstest]
fn generate_respects_the_bound() {
    let mut session = session_with(3, Some(1));
    let err = session.generate(Template::Connected).expect_err("r = 1, n = 3");
    assert_eq!(
        err,
        SessionError::Generate(GenerateError::CannotConnect {
            bound: 1,
            max_nodes: 2,
            nodes: 3,
        })
    );
    assert_eq!(session.graph().edge_count(), 0);

    session.set_max_degree(2).expect("no edges yet");
    assert_eq!(session.generate(Template::Cycle), Ok(3));
    assert_eq!(
        session.history().peek_undo().map(|snapshot| snapshot.label()),
        Some("generate")
    );
}

#[rstest]
fn clear_drops_nodes_and_overrides() {
    let mut session = session_with(2, Some(1));
    let explicit = Coloring::from_assignments(2, [(id(2), class(0))]).expect("in range");
    session.set_coloring(&explicit).expect("matching classes");
    session.clear();
    assert!(session.graph().is_empty());
    session.add_nodes(2).expect("fresh ids");
    assert_eq!(session.class_counts(), Ok(vec![1, 1]));
}

#[rstest]
fn bfs_errors_are_wrapped() {
    let session = session_with(2, None);
    let err = session.run_bfs(id(1), id(5)).expect_err("unknown end");
    assert_eq!(err.code(), SessionErrorCode::Bfs);
    assert_eq!(err.inner_code(), Some("BFS_NODE_NOT_FOUND"));
}

#[rstest]
fn builder_rejects_zero_depth_and_overfull_graphs() {
    let err = SessionBuilder::new()
        .with_history_depth(0)
        .build()
        .expect_err("zero depth");
    assert_eq!(err, SessionError::ZeroHistoryDepth);

    let mut star = Graph::new();
    let ids = star.add_nodes(4).expect("small graph");
    for &leaf in ids.iter().skip(1) {
        star.add_edge(id(1), leaf).expect("fresh edge");
    }
    let err = SessionBuilder::new()
        .with_graph(star)
        .with_max_degree(2)
        .build()
        .expect_err("centre has degree 3");
    assert_eq!(
        err,
        SessionError::DegreeBoundViolated {
            node: id(1),
            degree: 3,
            bound: 2,
        }
    );
}

#[rstest]
fn history_depth_caps_undo(#[values(1, 2, 5)] depth: usize) {
    let mut session = SessionBuilder::new()
        .with_history_depth(depth)
        .build()
        .expect("non-zero depth");
    for _ in 0..6 {
        session.add_node().expect("fresh id");
    }
    let mut undone = 0;
    while session.undo().expect("no bound").is_some() {
        undone += 1;
    }
    assert_eq!(undone, depth);
    assert_eq!(session.graph().node_count(), 6 - depth);
}
