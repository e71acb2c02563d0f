//! Command-line interface orchestration for the spillover simulator.
//!
//! Offers a `sweep` command that runs the nested-parameter simulation with a
//! chosen sampler and renders the aggregated statistics table as TSV.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, SamplerKind, SweepCommand, render_table, run_cli,
};
