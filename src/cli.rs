// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskgraph",
    version,
    about = "Run a plan of dependent subtasks with bounded parallelism.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the plan file (TOML).
    ///
    /// Default: `$TASKGRAPH_PLAN`, or `Taskgraph.toml` in the current directory.
    #[arg(long, value_name = "PATH")]
    pub plan: Option<String>,

    /// Override `[config].max_parallel` from the plan.
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Validate the plan and print the dependency-first order without
    /// running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dependency graph in Graphviz DOT format and exit.
    #[arg(long)]
    pub graph: bool,

    /// Write the execution report as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub report: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
