//! Command-line interface for the equigraph engines.
//!
//! Every command loads a graph from edge-list text (`1-2, 2-3`), runs one
//! engine through a [`equigraph_core::Session`] and returns a [`Report`]
//! that [`render_report`] prints as text or JSON.

mod commands;
mod render;

pub use commands::{
    AuxCommand, BfsCommand, Cli, CliError, ColorCommand, ColoringArgs, Command, GenerateCommand,
    OutputFormat, Report, SeedStrategy, TemplateKind, run_cli,
};
pub use render::render_report;

#[cfg(test)]
mod test_helpers;
