use equigraph_core::{ClassIndex, Coloring, NodeId, Session, SessionBuilder};

/// Builds a session over nodes `1..=nodes` whose edges come from `edges`,
/// written in edge-list notation.
#[must_use]
pub fn session_from(nodes: usize, edges: &str, max_degree: Option<usize>) -> Session {
    let mut builder = SessionBuilder::new();
    if let Some(r) = max_degree {
        builder = builder.with_max_degree(r);
    }
    let mut session = builder.build().expect("valid configuration");
    session.add_nodes(nodes).expect("small graph");
    if !edges.is_empty() {
        session.apply_edge_list(edges).expect("valid edge list");
    }
    session
}

/// Assigns consecutive ids starting at 1 to classes of the given sizes.
#[must_use]
pub fn coloring_with_sizes(sizes: &[usize]) -> Coloring {
    let mut next = 1_u32;
    let mut pairs = Vec::new();
    for (class, &size) in sizes.iter().enumerate() {
        for _ in 0..size {
            pairs.push((NodeId::new(next), ClassIndex::new(class)));
            next += 1;
        }
    }
    Coloring::from_assignments(sizes.len(), pairs).expect("classes in range")
}

#[must_use]
pub fn ids(raw: &[u32]) -> Vec<NodeId> {
    raw.iter().copied().map(NodeId::new).collect()
}
