//! Handles all user-facing output for the CLI.
//!
//! Status lines and grammar listings go to stdout; diagnostics go to stderr,
//! rendered through `miette` like every other CLI error.
//! Color is used only when the stream is a terminal.

use std::io::Write;
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::check::MatchResult;
use crate::grammar::lint::Shadowed;
use crate::grammar::Grammar;
use crate::report::ErrorSink;

fn stdout_color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

// ============================================================================
// CHECK OUTPUT
// ============================================================================

/// Prints one status line for a checked file, followed by its diagnostics.
pub fn print_result(path: &Path, result: MatchResult, errors: &ErrorSink) {
    let mut stdout = StandardStream::stdout(stdout_color_choice());
    let (label, color) = match result {
        MatchResult::Matched => ("ok", Color::Green),
        MatchResult::NotApplicable => ("skip", Color::Yellow),
        MatchResult::Invalid => ("FAIL", Color::Red),
    };

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{label:<4}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", path.display());
    let _ = stdout.flush();

    for diagnostic in errors {
        eprintln!("{:?}", miette::Report::new(diagnostic.clone()));
    }
}

pub fn print_summary(total: usize, failed: usize) {
    let mut stdout = StandardStream::stdout(stdout_color_choice());
    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(stdout, "checked {total} tree(s), {failed} failed");
    let _ = stdout.reset();
}

// ============================================================================
// GRAMMAR OUTPUT
// ============================================================================

pub fn print_grammar(grammar: &Grammar) {
    print!("{grammar}");
}

pub fn print_lint(unreachable: &[&str], shadowed: &[Shadowed]) {
    let mut stdout = StandardStream::stdout(stdout_color_choice());

    if unreachable.is_empty() && shadowed.is_empty() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        let _ = writeln!(stdout, "grammar is clean");
        let _ = stdout.reset();
        return;
    }

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    for name in unreachable {
        let _ = writeln!(stdout, "unreachable: {name}");
    }
    for s in shadowed {
        let _ = writeln!(
            stdout,
            "shadowed: {} in group {} (covered by {})",
            s.alternative,
            s.group,
            s.covered_by.join(", ")
        );
    }
    let _ = stdout.reset();
}
