//! The Treecheck Command-Line Interface.
//!
//! Checks serialized trees against the built-in language grammar, and prints
//! or lints the grammar itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::Diagnostic;
use thiserror::Error;
use walkdir::WalkDir;

use crate::ast::Node;
use crate::check::verify;
use crate::cli::args::{Command, TreecheckArgs};
use crate::config::{CheckOptions, ConfigError, Policy};
use crate::grammar::lang::language;
use crate::report::ErrorSink;

pub mod args;
pub mod output;

/// File extensions recognized as serialized trees.
const TREE_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(treecheck::cli::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a valid JSON tree")]
    #[diagnostic(code(treecheck::cli::parse))]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{path}' is not a valid YAML tree")]
    #[diagnostic(code(treecheck::cli::parse))]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unrecognized tree format for '{path}'")]
    #[diagnostic(
        code(treecheck::cli::format),
        help("trees are read from .json, .yaml or .yml files")
    )]
    UnknownFormat { path: String },

    #[error("failed to walk directory")]
    #[diagnostic(code(treecheck::cli::walk))]
    Walk(#[from] walkdir::Error),

    #[error("no tree files found under '{path}'")]
    #[diagnostic(code(treecheck::cli::empty))]
    NoTrees { path: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("{failed} of {total} tree(s) failed the check")]
    #[diagnostic(code(treecheck::cli::failed))]
    Failed { failed: usize, total: usize },

    #[error("the built-in grammar has {count} lint finding(s)")]
    #[diagnostic(code(treecheck::cli::lint))]
    Lint { count: usize },
}

/// The main entry point for the CLI.
pub fn run() {
    let args = TreecheckArgs::parse();

    if let Err(e) = dispatch(args) {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

fn dispatch(args: TreecheckArgs) -> Result<(), CliError> {
    let options = match &args.config {
        Some(path) => CheckOptions::load(path)?,
        None => CheckOptions::default(),
    };

    match args.command {
        Command::Check {
            paths,
            width,
            strict,
        } => handle_check(&paths, options, width, strict),
        Command::Grammar => {
            output::print_grammar(language());
            Ok(())
        }
        Command::Lint => handle_lint(),
    }
}

/// Handles the `check` subcommand.
///
/// Every tree is checked in accumulate mode so one bad file does not stop the
/// run; the command fails at the end if any tree was invalid.
fn handle_check(
    paths: &[PathBuf],
    mut options: CheckOptions,
    width: Option<usize>,
    strict: bool,
) -> Result<(), CliError> {
    options.policy = Policy::Accumulate;
    options.echo = false;
    if let Some(width) = width {
        options.print_width = width;
    }
    options.require_root |= strict;

    let files = discover(paths)?;
    let grammar = language();
    let mut failed = 0;

    for file in &files {
        let tree = load_tree(file)?;
        let mut errors = ErrorSink::new();
        let result = verify(&tree, grammar, &mut errors, &options);
        if result.is_invalid() {
            failed += 1;
        }
        output::print_result(file, result, &errors);
    }

    output::print_summary(files.len(), failed);

    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}

/// Handles the `lint` subcommand.
fn handle_lint() -> Result<(), CliError> {
    let grammar = language();
    let unreachable = grammar.unreachable();
    let shadowed = grammar.shadowed();

    output::print_lint(&unreachable, &shadowed);

    let count = unreachable.len() + shadowed.len();
    if count > 0 {
        return Err(CliError::Lint { count });
    }
    Ok(())
}

// ============================================================================
// TREE FILES
// ============================================================================

/// Expands directories into the tree files beneath them, sorted by name.
/// Files named explicitly are kept whatever their extension.
fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let before = files.len();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && is_tree_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        if files.len() == before {
            return Err(CliError::NoTrees {
                path: path.display().to_string(),
            });
        }
    }

    Ok(files)
}

fn is_tree_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TREE_EXTENSIONS.contains(&e))
}

/// Reads one serialized tree, choosing the format by extension.
pub fn load_tree(path: &Path) -> Result<Node, CliError> {
    let display = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: display.clone(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&source).map_err(|source| CliError::Json {
            path: display,
            source,
        }),
        Some("yaml" | "yml") => serde_yaml::from_str(&source).map_err(|source| CliError::Yaml {
            path: display,
            source,
        }),
        _ => Err(CliError::UnknownFormat { path: display }),
    }
}
