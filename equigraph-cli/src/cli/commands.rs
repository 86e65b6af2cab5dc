//! Command implementations and argument parsing for the equigraph CLI.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use equigraph_core::{
    AuxDigraph, BfsTrace, Coloring, Edge, Graph, GraphError, NodeId, ParseError, RepairRun,
    Session, SessionBuilder, SessionError, Template, parse_edge_list,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_MAX_STEPS: usize = 64;
const DEFAULT_RANDOM_EDGES: usize = 10;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "equigraph",
    about = "Trace BFS runs and rebalance degree-bounded colorings."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Report format written to stdout.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Trace a breadth-first search between two nodes.
    Bfs(BfsCommand),
    /// Repair a coloring until it is equitable or stuck.
    Color(ColorCommand),
    /// Print the auxiliary class digraph of a coloring.
    Aux(AuxCommand),
    /// Generate an edge list from a template.
    Generate(GenerateCommand),
}

/// Options accepted by the `bfs` command.
#[derive(Debug, Args, Clone)]
pub struct BfsCommand {
    /// Edge-list file, e.g. `1-2, 2-3`.
    pub graph: PathBuf,
    /// Start node id.
    #[arg(long)]
    pub start: u32,
    /// Target node id.
    #[arg(long)]
    pub end: u32,
    /// Print only the snapshot at this step index.
    #[arg(long)]
    pub step: Option<usize>,
}

/// Options shared by the coloring commands.
#[derive(Debug, Args, Clone)]
pub struct ColoringArgs {
    /// Edge-list file.
    pub graph: PathBuf,
    /// Maximum degree `r`; the coloring uses `r + 1` classes.
    #[arg(long, allow_negative_numbers = true)]
    pub max_degree: i64,
    /// Initial class assignment.
    #[arg(long, value_enum, default_value_t = SeedStrategy::Greedy)]
    pub seed: SeedStrategy,
}

/// Options accepted by the `color` command.
#[derive(Debug, Args, Clone)]
pub struct ColorCommand {
    /// Graph and coloring inputs.
    #[command(flatten)]
    pub coloring: ColoringArgs,
    /// Upper bound on repair steps.
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,
}

/// Options accepted by the `aux` command.
#[derive(Debug, Args, Clone)]
pub struct AuxCommand {
    /// Graph and coloring inputs.
    #[command(flatten)]
    pub coloring: ColoringArgs,
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Template to build.
    #[arg(value_enum)]
    pub template: TemplateKind,
    /// Number of nodes, numbered from 1.
    #[arg(long)]
    pub nodes: usize,
    /// Maximum degree to respect.
    #[arg(long, allow_negative_numbers = true)]
    pub max_degree: Option<i64>,
    /// Edges to add for the `random` template.
    #[arg(long, default_value_t = DEFAULT_RANDOM_EDGES)]
    pub count: usize,
    /// Seed for the `random` template.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// How the initial coloring is chosen.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum SeedStrategy {
    /// Proper greedy coloring in id order.
    Greedy,
    /// `(id - 1) mod k`, possibly improper.
    Modulo,
}

/// Generator templates selectable on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum TemplateKind {
    /// Every pair connected.
    Complete,
    /// A single cycle in id order.
    Cycle,
    /// The lowest id connected to every other node.
    Star,
    /// A connected graph within the degree bound.
    Connected,
    /// Many same-class edges under the modulo seed.
    ConflictProne,
    /// Seeded random edges.
    Random,
}

/// Report format.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Line-oriented text.
    Human,
    /// Pretty-printed JSON.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading the graph file failed.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The graph file was not valid edge-list text.
    #[error("invalid graph file `{path}`: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: ParseError,
    },
    /// The graph file described an invalid graph.
    #[error("invalid graph file `{path}`: {source}")]
    Graph {
        /// File being loaded.
        path: PathBuf,
        /// Structural failure.
        #[source]
        source: GraphError,
    },
    /// A core operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// `--step` pointed past the end of the trace.
    #[error("step {step} is out of range; the trace has {steps} steps")]
    StepOutOfRange {
        /// Requested index.
        step: usize,
        /// Trace length.
        steps: usize,
    },
}

/// Result of one CLI command, ready for rendering.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Report {
    /// A BFS trace, optionally narrowed to one step.
    Bfs {
        /// Full trace.
        trace: BfsTrace,
        /// Step selected with `--step`.
        step: Option<usize>,
    },
    /// A repair run.
    Color {
        /// Coloring before the first step.
        initial: Coloring,
        /// Steps taken and why they stopped.
        run: RepairRun,
    },
    /// An auxiliary digraph.
    Aux {
        /// Coloring the digraph was built from.
        coloring: Coloring,
        /// The digraph.
        aux: AuxDigraph,
    },
    /// A generated edge set.
    Generate {
        /// Template name.
        template: &'static str,
        /// Node count.
        nodes: usize,
        /// Generated edges.
        edges: Vec<Edge>,
    },
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the graph or running the command fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use equigraph_cli::cli::{BfsCommand, Cli, Command, OutputFormat, Report, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "1-2, 2-3\n")?;
/// let cli = Cli {
///     command: Command::Bfs(BfsCommand {
///         graph: file.path().to_path_buf(),
///         start: 1,
///         end: 3,
///         step: None,
///     }),
///     format: OutputFormat::Human,
/// };
/// let Report::Bfs { trace, .. } = run_cli(cli)? else {
///     panic!("bfs command yields a bfs report");
/// };
/// assert!(trace.path_found());
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<Report, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Bfs(command) => {
            span.record("command", "bfs");
            run_bfs_command(command)
        }
        Command::Color(command) => {
            span.record("command", "color");
            run_color_command(command)
        }
        Command::Aux(command) => {
            span.record("command", "aux");
            run_aux_command(command)
        }
        Command::Generate(command) => {
            span.record("command", "generate");
            run_generate_command(&command)
        }
    }
}

#[instrument(name = "cli.load_graph", err, fields(path = %path.display()))]
pub(super) fn load_graph(path: &Path) -> Result<Graph, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_edge_list(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = Graph::from_edge_list(&list).map_err(|source| CliError::Graph {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

pub(super) fn run_bfs_command(command: BfsCommand) -> Result<Report, CliError> {
    let graph = load_graph(&command.graph)?;
    let session = SessionBuilder::new().with_graph(graph).build()?;
    let trace = session.run_bfs(NodeId::new(command.start), NodeId::new(command.end))?;
    if let Some(step) = command.step
        && step >= trace.len()
    {
        return Err(CliError::StepOutOfRange {
            step,
            steps: trace.len(),
        });
    }
    Ok(Report::Bfs {
        trace,
        step: command.step,
    })
}

fn colored_session(args: &ColoringArgs) -> Result<Session, CliError> {
    let graph = load_graph(&args.graph)?;
    let mut session = SessionBuilder::new().with_graph(graph).build()?;
    session.set_max_degree(args.max_degree)?;
    if args.seed == SeedStrategy::Greedy {
        session.seed_with_greedy()?;
    }
    Ok(session)
}

pub(super) fn run_color_command(command: ColorCommand) -> Result<Report, CliError> {
    let mut session = colored_session(&command.coloring)?;
    let initial = session.coloring()?;
    let run = session.repair_until_equitable(command.max_steps)?;
    info!(
        steps = run.steps().len(),
        equitable = run.is_equitable(),
        "repair finished"
    );
    Ok(Report::Color { initial, run })
}

pub(super) fn run_aux_command(command: AuxCommand) -> Result<Report, CliError> {
    let session = colored_session(&command.coloring)?;
    Ok(Report::Aux {
        coloring: session.coloring()?,
        aux: session.aux_digraph()?,
    })
}

pub(super) fn template_for(command: &GenerateCommand) -> Template {
    match command.template {
        TemplateKind::Complete => Template::Complete,
        TemplateKind::Cycle => Template::Cycle,
        TemplateKind::Star => Template::Star,
        TemplateKind::Connected => Template::Connected,
        TemplateKind::ConflictProne => Template::ConflictProne,
        TemplateKind::Random => Template::Random {
            count: command.count,
            seed: command.seed,
        },
    }
}

pub(super) fn run_generate_command(command: &GenerateCommand) -> Result<Report, CliError> {
    let template = template_for(command);
    let mut session = SessionBuilder::new().build()?;
    session.add_nodes(command.nodes)?;
    if let Some(r) = command.max_degree {
        session.set_max_degree(r)?;
    }
    session.generate(template)?;
    Ok(Report::Generate {
        template: template.name(),
        nodes: session.graph().node_count(),
        edges: session.graph().edges().to_vec(),
    })
}
