// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `dagdecider`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagdecider",
    version,
    about = "Compute the next decisions of DAG workflow executions from their event history.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGDECIDER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse + validate a workflows file and print each workflow's DAG.
    Check {
        /// Workflows file (TOML, or JSON with a `.json` extension).
        #[arg(long, value_name = "PATH")]
        workflows: PathBuf,
    },

    /// Run one decision round and print the decisions as JSON.
    Decide {
        /// Workflows file (TOML, or JSON with a `.json` extension).
        #[arg(long, value_name = "PATH")]
        workflows: PathBuf,

        /// Decision task JSON, as returned by the backend's poll. `-` reads
        /// stdin.
        #[arg(long, value_name = "PATH", default_value = "-")]
        task: String,

        /// Pretty-print the decisions.
        #[arg(long)]
        pretty: bool,
    },
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
