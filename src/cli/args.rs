//! Defines the command-line arguments and subcommands for the treecheck CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "treecheck",
    version,
    about = "Check compiler syntax trees against the tree grammar."
)]
pub struct TreecheckArgs {
    /// Options file (YAML or JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check serialized trees (JSON or YAML). Directories are searched recursively.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Column limit for tree dumps.
        #[arg(long)]
        width: Option<usize>,
        /// Fail on trees whose root kind the grammar does not recognize.
        #[arg(long)]
        strict: bool,
    },
    /// Print the built-in grammar.
    Grammar,
    /// Report unreachable rules and shadowed group alternatives.
    Lint,
}
