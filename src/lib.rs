//! Treecheck: structural consistency checking for compiler syntax trees.
//!
//! After each compiler pass, [`check_tree`] walks the tree against a declared
//! grammar and fails loudly if a pass left a node with the wrong children,
//! a stray or missing type annotation, an unexpected scope, or data it should
//! not carry. Outside debug builds the entry point compiles to nothing.

pub mod ast;
pub mod check;
pub mod cli;
pub mod config;
pub mod grammar;
pub mod report;

// Re-exports for concise imports
pub use ast::{Node, NodeBuilder, NodeKind};
pub use check::{check_tree, check_tree_with, verify, Checker, MatchResult};
pub use config::{CheckOptions, Policy};
pub use grammar::{ElementId, Grammar, GrammarBuilder, GrammarError, Quantifier};
pub use report::{CheckDiagnostic, ErrorSink, Reporter, Violation};
