//! One-vertex-per-class rebalancing along an auxiliary-digraph path.
//!
//! A repair step moves one witness out of every class on a shortest path
//! from the largest class to the smallest one. Witnesses are re-checked
//! against a working copy while the chain is replayed and nothing is
//! committed unless every move succeeds.

use tracing::{Span, debug, field, info, instrument, warn};

use super::{AuxDigraph, ClassIndex, Coloring, ColoringError, build_aux};
use crate::graph::{Graph, NodeId};

/// A single reclassification performed by a repair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassMove {
    /// The moved node.
    pub node: NodeId,
    /// Class it left.
    pub from: ClassIndex,
    /// Class it joined.
    pub to: ClassIndex,
}

/// A committed repair step.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RepairStep {
    coloring: Coloring,
    path: Vec<ClassIndex>,
    moves: Vec<ClassMove>,
    aux: AuxDigraph,
}

impl RepairStep {
    /// Returns the coloring after the step.
    #[must_use]
    #[rustfmt::skip]
    pub fn coloring(&self) -> &Coloring { &self.coloring }

    /// Returns the class path `V+ -> ... -> V-` that was followed.
    #[must_use]
    #[rustfmt::skip]
    pub fn path(&self) -> &[ClassIndex] { &self.path }

    /// Returns the moves in path order.
    #[must_use]
    #[rustfmt::skip]
    pub fn moves(&self) -> &[ClassMove] { &self.moves }

    /// Returns the digraph the path was found in.
    #[must_use]
    #[rustfmt::skip]
    pub fn aux(&self) -> &AuxDigraph { &self.aux }

    /// Returns the class that shrank.
    #[must_use]
    pub fn source(&self) -> Option<ClassIndex> {
        self.path.first().copied()
    }

    /// Returns the class that grew.
    #[must_use]
    pub fn target(&self) -> Option<ClassIndex> {
        self.path.last().copied()
    }

    /// Consumes the step, returning the new coloring.
    #[must_use]
    pub fn into_coloring(self) -> Coloring {
        self.coloring
    }
}

/// Result of [`apply_repair_step`]. Only [`RepairOutcome::Applied`] changes
/// anything; the other variants are informational.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "outcome", rename_all = "kebab-case")
)]
pub enum RepairOutcome {
    /// The chain of moves was committed.
    Applied(RepairStep),
    /// `max <= min + 1` already holds.
    AlreadyEquitable,
    /// No class path leads from the largest to the smallest class.
    Unreachable {
        /// The largest class.
        from: ClassIndex,
        /// The smallest class.
        to: ClassIndex,
        /// Digraph that was searched.
        aux: AuxDigraph,
    },
    /// A pair on the path had no witness when replayed.
    PathBroken {
        /// Index of the pair `(path[position], path[position + 1])`.
        position: usize,
        /// The path that was replayed.
        path: Vec<ClassIndex>,
    },
}

impl RepairOutcome {
    /// Returns the kebab-case outcome label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::AlreadyEquitable => "already-equitable",
            Self::Unreachable { .. } => "unreachable",
            Self::PathBroken { .. } => "path-broken",
        }
    }

    /// Returns `true` for [`RepairOutcome::Applied`].
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Returns the committed step, if any.
    #[must_use]
    pub fn step(&self) -> Option<&RepairStep> {
        match self {
            Self::Applied(step) => Some(step),
            _ => None,
        }
    }
}

/// Result of replaying a class path on a working copy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathReplay {
    /// Every pair found a witness.
    Completed {
        /// Coloring after all moves.
        coloring: Coloring,
        /// Moves in path order.
        moves: Vec<ClassMove>,
    },
    /// The pair at `position` had no witness; nothing was changed.
    Broken {
        /// Index of the failing pair.
        position: usize,
    },
}

fn validate_path(path: &[ClassIndex], classes: usize) -> Result<(), ColoringError> {
    if path.len() < 2 {
        return Err(ColoringError::InvalidClassPath {
            position: path.len(),
        });
    }
    for (position, class) in path.iter().enumerate() {
        let repeated = path.iter().take(position).any(|earlier| earlier == class);
        if class.get() >= classes || repeated {
            return Err(ColoringError::InvalidClassPath { position });
        }
    }
    Ok(())
}

fn verify_transfer(
    before: &[usize],
    after: &[usize],
    source: ClassIndex,
    target: ClassIndex,
) -> Result<(), ColoringError> {
    for (index, (&was, &now)) in before.iter().zip(after).enumerate() {
        let class = ClassIndex::new(index);
        let expected = if class == source {
            was.checked_sub(1)
        } else if class == target {
            was.checked_add(1)
        } else {
            Some(was)
        };
        if expected != Some(now) {
            return Err(ColoringError::InvariantViolation {
                class,
                before: was,
                after: now,
            });
        }
    }
    Ok(())
}

/// Replays `path` on a copy of `coloring`, moving the lowest-id eligible
/// witness out of each class into the next one.
///
/// Eligibility is judged against the working copy, so earlier moves on the
/// path are taken into account. The input coloring is never modified.
///
/// # Errors
/// Returns [`ColoringError::InvalidClassPath`] for paths shorter than two
/// classes, with out-of-range classes or with repeats, and
/// [`ColoringError::InvariantViolation`] if the net class sizes come out
/// wrong.
pub fn replay_class_path(
    graph: &Graph,
    coloring: &Coloring,
    path: &[ClassIndex],
) -> Result<PathReplay, ColoringError> {
    validate_path(path, coloring.classes())?;
    let adjacency = graph.adjacency();
    let mut working = coloring.clone();
    let mut moves = Vec::with_capacity(path.len() - 1);

    for (position, pair) in path.windows(2).enumerate() {
        let &[from, to] = pair else {
            continue;
        };
        let witness = working.members(from).into_iter().find(|&node| {
            !adjacency.touches_any(node, |neighbour| working.class_of(neighbour) == Some(to))
        });
        let Some(node) = witness else {
            debug!(position, %from, %to, "no witness on replay");
            return Ok(PathReplay::Broken { position });
        };
        working.assign(node, to)?;
        moves.push(ClassMove { node, from, to });
    }

    if let (Some(&source), Some(&target)) = (path.first(), path.last()) {
        verify_transfer(
            &coloring.class_counts(),
            &working.class_counts(),
            source,
            target,
        )?;
    }
    Ok(PathReplay::Completed {
        coloring: working,
        moves,
    })
}

fn extremes(counts: &[usize]) -> Option<(ClassIndex, usize, ClassIndex, usize)> {
    let max = *counts.iter().max()?;
    let min = *counts.iter().min()?;
    let source = counts.iter().position(|&size| size == max)?;
    let target = counts.iter().position(|&size| size == min)?;
    Some((ClassIndex::new(source), max, ClassIndex::new(target), min))
}

/// Performs one equitable-repair step.
///
/// `V+` is the lowest-index largest class and `V-` the lowest-index smallest
/// class. A shortest path between them in the auxiliary digraph is replayed
/// on a working copy and committed only if every move succeeds; the
/// committed coloring has exactly one node fewer in `V+`, one more in `V-`
/// and unchanged sizes elsewhere.
///
/// The coloring is expected to be proper. An improper input is repaired all
/// the same, with a warning.
///
/// # Errors
/// Returns [`ColoringError::TooFewClasses`] for `k < 2`,
/// [`ColoringError::EmptyGraph`] for a graph without nodes, and
/// [`ColoringError::UnassignedNode`] / [`ColoringError::UnknownNode`] when
/// the coloring does not cover the graph exactly.
///
/// # Examples
/// ```
/// use equigraph_core::{ClassIndex, Coloring, Graph, RepairOutcome, apply_repair_step};
///
/// let mut graph = Graph::new();
/// let ids = graph.add_nodes(3)?;
/// let coloring = Coloring::from_assignments(2, ids.iter().map(|&id| (id, ClassIndex::new(0))))?;
///
/// let outcome = apply_repair_step(&graph, &coloring)?;
/// let step = outcome.step().expect("edgeless graphs always repair");
/// assert_eq!(step.coloring().class_counts(), vec![2, 1]);
/// assert_eq!(step.moves()[0].node, ids[0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "coloring.repair_step",
    err,
    skip(graph, coloring),
    fields(classes = coloring.classes(), nodes = graph.node_count(), outcome = field::Empty),
)]
pub fn apply_repair_step(
    graph: &Graph,
    coloring: &Coloring,
) -> Result<RepairOutcome, ColoringError> {
    let outcome = repair_once(graph, coloring)?;
    Span::current().record("outcome", outcome.label());
    record_outcome(&outcome);
    Ok(outcome)
}

fn repair_once(graph: &Graph, coloring: &Coloring) -> Result<RepairOutcome, ColoringError> {
    let classes = coloring.classes();
    if classes < 2 {
        return Err(ColoringError::TooFewClasses {
            classes,
            required: 2,
        });
    }
    if graph.is_empty() {
        return Err(ColoringError::EmptyGraph);
    }
    coloring.validate_for(graph)?;
    let conflicts = coloring.conflicts(graph).len();
    if conflicts > 0 {
        warn!(conflicts, "repairing an improper coloring");
    }

    let counts = coloring.class_counts();
    let Some((source, max, target, min)) = extremes(&counts) else {
        return Ok(RepairOutcome::AlreadyEquitable);
    };
    if max <= min + 1 {
        return Ok(RepairOutcome::AlreadyEquitable);
    }

    let aux = build_aux(graph, coloring);
    let Some(path) = aux.shortest_path(source, target) else {
        info!(%source, %target, "smallest class unreachable from largest");
        return Ok(RepairOutcome::Unreachable {
            from: source,
            to: target,
            aux,
        });
    };

    match replay_class_path(graph, coloring, &path)? {
        PathReplay::Broken { position } => Ok(RepairOutcome::PathBroken { position, path }),
        PathReplay::Completed {
            coloring: repaired,
            moves,
        } => {
            debug!(moves = moves.len(), %source, %target, "repair step committed");
            Ok(RepairOutcome::Applied(RepairStep {
                coloring: repaired,
                path,
                moves,
                aux,
            }))
        }
    }
}

#[cfg(feature = "metrics")]
fn record_outcome(outcome: &RepairOutcome) {
    if outcome.is_applied() {
        metrics::counter!("repair_steps_applied").increment(1);
    } else {
        metrics::counter!("repair_steps_rejected", "outcome" => outcome.label()).increment(1);
    }
}

#[cfg(not(feature = "metrics"))]
fn record_outcome(_outcome: &RepairOutcome) {}

/// Why [`repair_until_equitable`] stopped.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "reason", rename_all = "kebab-case")
)]
pub enum RunTermination {
    /// The final coloring is equitable.
    Equitable,
    /// The smallest class became unreachable.
    Unreachable {
        /// The largest class at that point.
        from: ClassIndex,
        /// The smallest class at that point.
        to: ClassIndex,
    },
    /// A replay failed.
    PathBroken {
        /// Index of the failing pair.
        position: usize,
    },
    /// The step budget ran out first.
    StepLimitReached,
}

/// Steps taken by [`repair_until_equitable`] and where they ended.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RepairRun {
    steps: Vec<RepairStep>,
    final_coloring: Coloring,
    termination: RunTermination,
}

impl RepairRun {
    /// Returns every committed step in order.
    #[must_use]
    #[rustfmt::skip]
    pub fn steps(&self) -> &[RepairStep] { &self.steps }

    /// Returns the coloring after the last committed step.
    #[must_use]
    #[rustfmt::skip]
    pub fn final_coloring(&self) -> &Coloring { &self.final_coloring }

    /// Returns why the run stopped.
    #[must_use]
    #[rustfmt::skip]
    pub fn termination(&self) -> &RunTermination { &self.termination }

    /// Returns `true` when the run ended equitable.
    #[must_use]
    pub fn is_equitable(&self) -> bool {
        self.termination == RunTermination::Equitable
    }
}

/// Applies [`apply_repair_step`] until it stops committing or `max_steps`
/// steps have been taken.
///
/// # Errors
/// Propagates the first [`ColoringError`] raised by a step.
#[instrument(
    name = "coloring.repair_until_equitable",
    err,
    skip(graph, coloring),
    fields(classes = coloring.classes()),
)]
pub fn repair_until_equitable(
    graph: &Graph,
    coloring: &Coloring,
    max_steps: usize,
) -> Result<RepairRun, ColoringError> {
    let mut current = coloring.clone();
    let mut steps = Vec::new();
    let mut termination = None;
    while steps.len() < max_steps {
        match apply_repair_step(graph, &current)? {
            RepairOutcome::Applied(step) => {
                current = step.coloring.clone();
                steps.push(step);
            }
            RepairOutcome::AlreadyEquitable => {
                termination = Some(RunTermination::Equitable);
                break;
            }
            RepairOutcome::Unreachable { from, to, .. } => {
                termination = Some(RunTermination::Unreachable { from, to });
                break;
            }
            RepairOutcome::PathBroken { position, .. } => {
                termination = Some(RunTermination::PathBroken { position });
                break;
            }
        }
    }
    let termination = termination.unwrap_or(if current.is_equitable() {
        RunTermination::Equitable
    } else {
        RunTermination::StepLimitReached
    });
    info!(steps = steps.len(), ?termination, "repair run finished");
    Ok(RepairRun {
        steps,
        final_coloring: current,
        termination,
    })
}
