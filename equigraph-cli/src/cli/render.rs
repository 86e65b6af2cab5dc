//! Report rendering for stdout.

use std::io::{self, Write};

use equigraph_core::{
    AuxDigraph, BfsStep, BfsTrace, ClassRole, Coloring, Edge, NodeId, RepairRun, RunTermination,
};

use super::commands::{OutputFormat, Report};

/// Renders `report` to `writer` in the requested format.
///
/// Human output for `generate` is a single edge-list line, so it can be fed
/// straight back to the other commands.
///
/// # Errors
/// Returns [`io::Error`] if writing or JSON encoding fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use equigraph_cli::cli::{OutputFormat, Report, render_report};
/// # use equigraph_core::{Edge, NodeId};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let report = Report::Generate {
///     template: "star",
///     nodes: 3,
///     edges: vec![
///         Edge::new(NodeId::new(1), NodeId::new(2))?,
///         Edge::new(NodeId::new(1), NodeId::new(3))?,
///     ],
/// };
/// let mut buffer = Vec::new();
/// render_report(&report, OutputFormat::Human, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "1-2, 1-3\n");
/// # Ok(())
/// # }
/// ```
pub fn render_report(
    report: &Report,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)
        }
        OutputFormat::Human => match report {
            Report::Bfs { trace, step } => render_bfs(trace, *step, writer),
            Report::Color { initial, run } => render_repair(initial, run, writer),
            Report::Aux { coloring, aux } => render_aux(coloring, aux, writer),
            Report::Generate { edges, .. } => writeln!(writer, "{}", edge_list(edges)),
        },
    }
}

fn join(ids: &[NodeId], separator: &str) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

pub(super) fn edge_list(edges: &[Edge]) -> String {
    edges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_step(trace: &BfsTrace, step: &BfsStep, mut writer: impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "{}\t{}\t{}",
        step.step_index,
        step.action,
        step.describe(trace.start(), trace.end())
    )?;
    writeln!(writer, "\tqueue: [{}]", join(&step.queue, ", "))
}

fn render_bfs(trace: &BfsTrace, only: Option<usize>, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "bfs {} -> {}", trace.start(), trace.end())?;
    let selected: Vec<&BfsStep> = match only {
        Some(index) => trace.step(index).into_iter().collect(),
        None => trace.steps().iter().collect(),
    };
    for step in selected {
        render_step(trace, step, &mut writer)?;
    }
    match trace.final_path() {
        Some(path) => writeln!(
            writer,
            "path ({} hops): {}",
            path.len().saturating_sub(1),
            join(path, " -> ")
        ),
        None => writeln!(writer, "no path"),
    }
}

fn sizes(coloring: &Coloring) -> String {
    coloring
        .class_counts()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

const fn termination_label(termination: &RunTermination) -> &'static str {
    match termination {
        RunTermination::Equitable => "equitable",
        RunTermination::Unreachable { .. } => "unreachable",
        RunTermination::PathBroken { .. } => "path-broken",
        RunTermination::StepLimitReached => "step-limit-reached",
    }
}

fn render_repair(initial: &Coloring, run: &RepairRun, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "classes: {}", initial.classes())?;
    writeln!(writer, "initial sizes: [{}]", sizes(initial))?;
    for (index, step) in run.steps().iter().enumerate() {
        let path = step
            .path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        let moves = step
            .moves()
            .iter()
            .map(|mv| format!("{}:{}->{}", mv.node, mv.from, mv.to))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            writer,
            "step {}: path {path}; moves {moves}; sizes [{}]",
            index + 1,
            sizes(step.coloring())
        )?;
    }
    writeln!(writer, "termination: {}", termination_label(run.termination()))?;
    let last = run.final_coloring();
    writeln!(writer, "final sizes: [{}]", sizes(last))?;
    for (node, class) in last.iter() {
        writeln!(writer, "{node}\t{class}")?;
    }
    Ok(())
}

const fn role_label(role: ClassRole) -> &'static str {
    match role {
        ClassRole::Large => "large",
        ClassRole::Small => "small",
        ClassRole::Normal => "normal",
    }
}

fn render_aux(coloring: &Coloring, aux: &AuxDigraph, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "sizes: [{}]", sizes(coloring))?;
    for node in aux.nodes() {
        writeln!(
            writer,
            "class {}\tsize {}\t{}",
            node.class,
            node.size,
            role_label(node.role)
        )?;
    }
    for edge in aux.edges() {
        writeln!(writer, "{} -> {}\twitness {}", edge.from, edge.to, edge.witness)?;
    }
    Ok(())
}
