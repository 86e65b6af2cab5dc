//! Equigraph core library: a graph model, a replayable BFS step engine and
//! equitable repair of degree-bounded colorings.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod bfs;
mod coloring;
mod error;
mod graph;
mod history;
mod session;

#[cfg(test)]
mod test_utils;

pub use crate::{
    bfs::{
        BfsAction, BfsCursor, BfsError, BfsErrorCode, BfsStep, BfsTrace, EndpointRole, run_bfs,
    },
    coloring::{
        AuxDigraph, AuxEdge, ClassIndex, ClassMove, ClassNode, ClassRole, Coloring,
        ColoringError, ColoringErrorCode, PathReplay, RepairOutcome, RepairRun, RepairStep,
        RunTermination, apply_repair_step, build_aux, equitable_sizes, greedy_coloring,
        repair_until_equitable, replay_class_path, seed_class, seed_coloring,
    },
    error::{BoundedOperation, Result, SessionError, SessionErrorCode},
    graph::{
        Adjacency, DegreeBound, EXAMPLE_END, EXAMPLE_START, Edge, EdgeList, GenerateError,
        GenerateErrorCode, Graph, GraphError, GraphErrorCode, GraphProperties, NodeId,
        ParseError, ParseErrorCode, Template, example_graph, generate, parse_edge_list,
    },
    history::{History, Snapshot},
    session::{DEFAULT_HISTORY_DEPTH, Session, SessionBuilder},
};
