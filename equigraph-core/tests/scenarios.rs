//! End-to-end scenarios through the `Session` surface.

mod common;

use std::collections::BTreeMap;

use common::{coloring_with_sizes, ids, session_from};
use equigraph_core::{
    BfsAction, ClassIndex, GenerateError, NodeId, RepairOutcome, SessionError, Template,
    equitable_sizes,
};
use rstest::rstest;

#[rstest]
fn path_query_reports_shortest_path_and_distances() {
    let session = session_from(3, "1-2, 2-3", None);
    let trace = session
        .run_bfs(NodeId::new(1), NodeId::new(3))
        .expect("both endpoints exist");

    assert_eq!(trace.final_path(), Some(ids(&[1, 2, 3]).as_slice()));
    let last = trace.last().expect("non-empty trace");
    assert_eq!(last.action, BfsAction::Found);
    let expected: BTreeMap<NodeId, usize> = [(1, 0), (2, 1), (3, 2)]
        .into_iter()
        .map(|(node, distance)| (NodeId::new(node), distance))
        .collect();
    assert_eq!(last.distance, expected);
}

#[rstest]
fn disconnected_query_ends_not_found() {
    let session = session_from(2, "", None);
    let trace = session
        .run_bfs(NodeId::new(1), NodeId::new(2))
        .expect("both endpoints exist");

    let terminal: Vec<_> = trace
        .steps()
        .iter()
        .filter(|step| step.action == BfsAction::NotFound)
        .collect();
    assert_eq!(terminal.len(), 1);
    assert!(trace.final_path().is_none());
    assert!(!trace.path_found());
    let last = trace.last().expect("non-empty trace");
    assert!(!last.distance.contains_key(&NodeId::new(2)));
}

#[rstest]
fn connected_graph_under_degree_one_is_impossible() {
    let mut session = session_from(3, "", Some(1));
    let err = session
        .generate(Template::Connected)
        .expect_err("three nodes cannot be connected with r = 1");
    assert!(matches!(
        err,
        SessionError::Generate(GenerateError::CannotConnect { bound: 1, .. })
    ));
    assert!(err.to_string().contains("max degree 1 needs n <= 2"));
    assert_eq!(session.graph().edge_count(), 0);
}

#[rstest]
fn lopsided_classes_converge_to_equitable_sizes() {
    let mut session = session_from(7, "", Some(3));
    session
        .set_coloring(&coloring_with_sizes(&[4, 1, 1, 1]))
        .expect("four classes for r = 3");

    let outcome = session.repair_step().expect("valid input");
    let step = outcome.step().expect("edgeless graph repairs");
    assert_eq!(step.source(), Some(ClassIndex::new(0)));
    assert_eq!(step.target(), Some(ClassIndex::new(1)));
    assert_eq!(session.class_counts(), Ok(vec![3, 2, 1, 1]));

    let run = session.repair_until_equitable(16).expect("valid input");
    assert!(run.is_equitable());
    let mut sizes = session.class_counts().expect("bound set");
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(sizes, equitable_sizes(7, 4));
}

#[rstest]
fn equitable_coloring_is_left_unchanged() {
    let mut session = session_from(6, "", Some(3));
    let coloring = coloring_with_sizes(&[2, 2, 1, 1]);
    session.set_coloring(&coloring).expect("four classes");

    assert_eq!(session.repair_step(), Ok(RepairOutcome::AlreadyEquitable));
    assert_eq!(session.coloring(), Ok(coloring));
}

#[rstest]
fn repair_keeps_coloring_proper_on_a_generated_graph() {
    let mut session = session_from(9, "", Some(2));
    session.generate(Template::Cycle).expect("cycle fits r = 2");
    session.seed_with_greedy().expect("three classes suffice");

    let run = session.repair_until_equitable(32).expect("valid input");
    let coloring = session.coloring().expect("bound set");
    assert!(coloring.is_proper(session.graph()));
    assert_eq!(coloring.len(), 9);
    assert!(
        run.steps()
            .iter()
            .all(|step| step.coloring().is_proper(session.graph()))
    );
}
