//! # Check Diagnostics
//!
//! Every violation the engine finds is turned into a [`CheckDiagnostic`] and
//! handed to a [`Reporter`]. Which reporter is used decides the policy:
//!
//! - [`ErrorSink`] records diagnostics for the caller and lets the engine
//!   unwind normally.
//! - [`StderrEcho`] prints each diagnostic to stderr before forwarding it.
//! - [`AbortOnError`] prints the diagnostic, records it, and panics, so a
//!   debugging session stops at the first fault with the offending tree still
//!   on the stack.
//!
//! Output goes to stderr through `termcolor`, colored only when stderr is a
//! terminal.

use std::io::{self, Write};

use miette::{Diagnostic, SourceSpan};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

use crate::ast::{DataHandle, Node, NodeKind, Span};

// ============================================================================
// VIOLATIONS
// ============================================================================

/// What exactly was wrong with a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("found {found} {}, expected more", child_noun(.found))]
    MissingChildren { found: usize },

    #[error("child {index} has invalid kind {kind}")]
    InvalidChildKind { index: usize, kind: NodeKind },

    #[error("child {index} ({kind}, {print}) unexpected")]
    UnexpectedChild {
        index: usize,
        kind: NodeKind,
        print: String,
    },

    #[error("unexpected type")]
    UnexpectedType,

    #[error("expected type not found")]
    MissingType,

    #[error("type field has invalid kind {kind}")]
    InvalidTypeKind { kind: NodeKind },

    #[error("unexpected scope")]
    UnexpectedScope,

    #[error("expected scope not found")]
    MissingScope,

    #[error("unexpected data {handle}")]
    UnexpectedData { handle: DataHandle },

    #[error("kind {kind} is not part of the grammar here")]
    Ungrammatical { kind: NodeKind },
}

fn child_noun(found: &usize) -> &'static str {
    if *found == 1 {
        "child"
    } else {
        "children"
    }
}

/// Broad classification of violations, for filtering and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationCategory {
    Structure,
    Type,
    Scope,
    Data,
    Grammar,
}

impl Violation {
    pub fn category(&self) -> ViolationCategory {
        match self {
            Self::MissingChildren { .. }
            | Self::InvalidChildKind { .. }
            | Self::UnexpectedChild { .. } => ViolationCategory::Structure,

            Self::UnexpectedType | Self::MissingType | Self::InvalidTypeKind { .. } => {
                ViolationCategory::Type
            }

            Self::UnexpectedScope | Self::MissingScope => ViolationCategory::Scope,

            Self::UnexpectedData { .. } => ViolationCategory::Data,

            Self::Ungrammatical { .. } => ViolationCategory::Grammar,
        }
    }

    /// The zero-based sibling index the violation refers to, if any.
    pub fn child_index(&self) -> Option<usize> {
        match self {
            Self::InvalidChildKind { index, .. } | Self::UnexpectedChild { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

// ============================================================================
// DIAGNOSTIC RECORD
// ============================================================================

/// A single structural fault found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("Internal error: AST node {kind} ({print}), {violation}")]
#[diagnostic(code(treecheck::malformed_tree))]
pub struct CheckDiagnostic {
    pub kind: NodeKind,
    pub print: String,
    /// The rule that recognized the node and rejected it.
    pub rule: String,
    pub violation: Violation,
    pub span: Span,
    /// Bounded-width rendering of the offending subtree.
    #[source_code]
    pub dump: String,
    /// The first line of `dump`, which names the node itself.
    #[label("rejected here")]
    pub head: SourceSpan,
    #[help]
    pub hint: String,
}

impl CheckDiagnostic {
    pub fn new(node: &Node, rule: &str, violation: Violation, print_width: usize) -> Self {
        let dump = node.render(print_width);
        let head_len = dump.find('\n').unwrap_or(dump.len());
        Self {
            kind: node.kind(),
            print: node.print().to_string(),
            rule: rule.to_string(),
            violation,
            span: node.span,
            head: SourceSpan::from((0, head_len)),
            hint: format!(
                "rule `{rule}` rejected this node at {}..{}",
                node.span.start, node.span.end
            ),
            dump,
        }
    }

    /// Writes the diagnostic in the stderr layout: a one-line preamble
    /// followed by the rendered subtree.
    pub fn write_to(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "Internal error:")?;
        out.reset()?;
        writeln!(
            out,
            " AST node {} ({}), {}",
            self.kind, self.print, self.violation
        )?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(
            out,
            "  --> rule `{}`, span {}..{}",
            self.rule, self.span.start, self.span.end
        )?;
        out.reset()?;

        write!(out, "{}", self.dump)
    }
}

// ============================================================================
// REPORTERS
// ============================================================================

/// Receives diagnostics from the engine.
pub trait Reporter {
    fn report(&mut self, diagnostic: CheckDiagnostic);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, diagnostic: CheckDiagnostic) {
        (**self).report(diagnostic);
    }
}

/// Accumulates diagnostics for the caller.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    diagnostics: Vec<CheckDiagnostic>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CheckDiagnostic> {
        self.diagnostics.iter()
    }

    pub fn first(&self) -> Option<&CheckDiagnostic> {
        self.diagnostics.first()
    }

    pub fn into_vec(self) -> Vec<CheckDiagnostic> {
        self.diagnostics
    }
}

impl Reporter for ErrorSink {
    fn report(&mut self, diagnostic: CheckDiagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a ErrorSink {
    type Item = &'a CheckDiagnostic;
    type IntoIter = std::slice::Iter<'a, CheckDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Prints each diagnostic to stderr, then forwards it to `inner`.
pub struct StderrEcho<R> {
    inner: R,
    stream: StandardStream,
}

impl<R: Reporter> StderrEcho<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            stream: StandardStream::stderr(stderr_color_choice()),
        }
    }

}

impl<R: Reporter> Reporter for StderrEcho<R> {
    fn report(&mut self, diagnostic: CheckDiagnostic) {
        let _ = diagnostic.write_to(&mut self.stream);
        let _ = self.stream.flush();
        self.inner.report(diagnostic);
    }
}

/// Prints the first diagnostic to stderr, forwards it to `inner`, then panics.
///
/// The forwarded record survives the unwind, so a caller that catches the
/// panic still finds the fault in its sink.
pub struct AbortOnError<R> {
    inner: R,
}

impl<R: Reporter> AbortOnError<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Reporter> Reporter for AbortOnError<R> {
    fn report(&mut self, diagnostic: CheckDiagnostic) {
        let mut stream = StandardStream::stderr(stderr_color_choice());
        let _ = diagnostic.write_to(&mut stream);
        let _ = stream.flush();

        let message = diagnostic.to_string();
        self.inner.report(diagnostic);
        panic!("tree check failed: {message}");
    }
}

/// Colors only when stderr is attached to a terminal.
pub fn stderr_color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use super::*;
    use crate::ast::NodeBuilder;

    fn sample() -> CheckDiagnostic {
        let node = NodeBuilder::new(NodeKind::Add)
            .child(NodeBuilder::leaf(NodeKind::Int, "1"))
            .span(4, 9)
            .build();
        CheckDiagnostic::new(&node, "binop", Violation::MissingChildren { found: 1 }, 80)
    }

    #[test]
    fn message_matches_preamble_layout() {
        assert_eq!(
            sample().to_string(),
            "Internal error: AST node add (add), found 1 child, expected more"
        );
    }

    #[test]
    fn plural_child_count() {
        assert_eq!(
            Violation::MissingChildren { found: 0 }.to_string(),
            "found 0 children, expected more"
        );
    }

    #[test]
    fn unexpected_child_names_index_and_print() {
        let v = Violation::UnexpectedChild {
            index: 2,
            kind: NodeKind::Int,
            print: "3".into(),
        };
        assert_eq!(v.to_string(), "child 2 (int, 3) unexpected");
        assert_eq!(v.child_index(), Some(2));
        assert_eq!(v.category(), ViolationCategory::Structure);
    }

    #[test]
    fn data_violation_shows_handle() {
        let v = Violation::UnexpectedData {
            handle: DataHandle(42),
        };
        assert_eq!(v.to_string(), "unexpected data #42");
        assert_eq!(v.category(), ViolationCategory::Data);
    }

    #[test]
    fn written_layout_includes_rule_and_dump() {
        let mut out = NoColor::new(Vec::new());
        sample().write_to(&mut out).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            text,
            "Internal error: AST node add (add), found 1 child, expected more\n  --> rule `binop`, span 4..9\n(add (int 1))\n"
        );
    }

    #[test]
    fn sink_accumulates_in_order() {
        let mut sink = ErrorSink::new();
        let reporter: &mut dyn Reporter = &mut sink;
        reporter.report(sample());
        reporter.report(sample());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.first().map(|d| d.rule.as_str()), Some("binop"));
    }

    #[test]
    #[should_panic(expected = "tree check failed")]
    fn abort_reporter_panics() {
        AbortOnError::new(ErrorSink::new()).report(sample());
    }

    #[test]
    fn abort_reporter_records_before_panicking() {
        let mut sink = ErrorSink::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            AbortOnError::new(&mut sink).report(sample());
        }));
        assert!(outcome.is_err());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.first().map(|d| d.rule.as_str()), Some("binop"));
    }

    #[test]
    fn miette_view_labels_the_node_head() {
        let node = NodeBuilder::new(NodeKind::Seq)
            .child(NodeBuilder::leaf(NodeKind::Int, "1"))
            .span(2, 7)
            .build();
        let d = CheckDiagnostic::new(&node, "seq", Violation::UnexpectedScope, 10);

        assert_eq!(d.dump, "(seq\n  (int 1)\n)\n");
        assert_eq!(d.code().map(|c| c.to_string()).as_deref(), Some("treecheck::malformed_tree"));
        assert_eq!(
            d.help().map(|h| h.to_string()).as_deref(),
            Some("rule `seq` rejected this node at 2..7")
        );
        let labels: Vec<_> = d.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!((labels[0].offset(), labels[0].len()), (0, 4));
        assert!(d.source_code().is_some());
    }
}
