//! # Matching Engine
//!
//! Decides whether a node satisfies a rule or group of a [`Grammar`], recursing
//! depth-first into children and type fields.
//!
//! Every match has one of three outcomes, see [`MatchResult`]. The difference
//! between "this element does not apply to the node" and "it applies and the
//! node is wrong" drives the whole algorithm: groups try their alternatives
//! in order until one applies, and the first one that applies decides.
//!
//! Violations are reported through the [`Reporter`] the [`Checker`] was built
//! with, then `Invalid` unwinds all the way out without trying anything else.

mod quantifier;

use crate::ast::Node;
use crate::config::{CheckOptions, Policy};
use crate::grammar::{Clause, Element, ElementId, Grammar, Group, Rule, ScopeReq, TypeReq};
use crate::report::{AbortOnError, CheckDiagnostic, ErrorSink, Reporter, StderrEcho, Violation};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Outcome of matching a node against a rule or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// The node satisfies the element.
    Matched,
    /// The element does not recognize the node's kind. Not an error.
    NotApplicable,
    /// The element recognized the node but a constraint failed. Already
    /// reported.
    Invalid,
}

impl MatchResult {
    pub fn is_invalid(self) -> bool {
        self == MatchResult::Invalid
    }
}

/// Requirements accumulated while walking a rule body for one node.
#[derive(Debug, Clone, Copy, Default)]
struct RuleState {
    scope: ScopeReq,
    type_req: TypeReq,
    has_data: bool,
    /// Index of the next unconsumed child.
    cursor: usize,
}

/// Walks a tree against a grammar, reporting violations.
pub struct Checker<'g, R> {
    grammar: &'g Grammar,
    reporter: R,
    print_width: usize,
}

// ============================================================================
// ENGINE
// ============================================================================

impl<'g, R: Reporter> Checker<'g, R> {
    pub fn new(grammar: &'g Grammar, reporter: R, print_width: usize) -> Self {
        Self {
            grammar,
            reporter,
            print_width,
        }
    }

    /// Matches `node` against the grammar's root group.
    pub fn check_root(&mut self, node: &Node) -> MatchResult {
        self.check(node, self.grammar.root())
    }

    /// Matches `node` against the rule or group `id`.
    pub fn check(&mut self, node: &Node, id: ElementId) -> MatchResult {
        let grammar = self.grammar;
        match grammar.element(id) {
            Element::Rule(rule) => self.check_rule(node, rule),
            Element::Group(group) => self.check_group(node, group),
        }
    }

    fn check_group(&mut self, node: &Node, group: &Group) -> MatchResult {
        for alt in &group.alternatives {
            let r = self.check(node, *alt);
            if r != MatchResult::NotApplicable {
                return r;
            }
        }
        MatchResult::NotApplicable
    }

    fn check_rule(&mut self, node: &Node, rule: &Rule) -> MatchResult {
        if !rule.accepts(node.kind()) {
            return MatchResult::NotApplicable;
        }

        let mut state = RuleState::default();
        if self.run_clauses(node, rule, &rule.clauses, &mut state).is_invalid() {
            return MatchResult::Invalid;
        }

        self.check_extras(node, rule, &state)
    }

    fn run_clauses(
        &mut self,
        node: &Node,
        rule: &Rule,
        clauses: &[Clause],
        state: &mut RuleState,
    ) -> MatchResult {
        for clause in clauses {
            match clause {
                Clause::Children(step) => {
                    if self.consume(node, rule, *step, &mut state.cursor).is_invalid() {
                        return MatchResult::Invalid;
                    }
                }
                Clause::Scope(scope) => state.scope = *scope,
                Clause::Type(type_req) => state.type_req = *type_req,
                Clause::Data => state.has_data = true,
                Clause::When { condition, then } => {
                    if condition.holds(node)
                        && self.run_clauses(node, rule, then, state).is_invalid()
                    {
                        return MatchResult::Invalid;
                    }
                }
            }
        }
        MatchResult::Matched
    }

    /// Checks everything beyond the child pattern: leftover children, the
    /// type field, scope and data.
    fn check_extras(&mut self, node: &Node, rule: &Rule, state: &RuleState) -> MatchResult {
        if let Some(child) = node.child(state.cursor) {
            let violation = Violation::UnexpectedChild {
                index: state.cursor,
                kind: child.kind(),
                print: child.print().to_string(),
            };
            return self.fail(node, rule, violation);
        }

        match (node.type_field(), state.type_req) {
            (Some(_), TypeReq::Forbidden) => {
                return self.fail(node, rule, Violation::UnexpectedType);
            }
            (None, TypeReq::Required(_)) => {
                return self.fail(node, rule, Violation::MissingType);
            }
            (Some(type_field), TypeReq::Optional(id) | TypeReq::Required(id)) => {
                match self.check(type_field, id) {
                    MatchResult::Matched => {}
                    MatchResult::Invalid => return MatchResult::Invalid,
                    MatchResult::NotApplicable => {
                        let violation = Violation::InvalidTypeKind {
                            kind: type_field.kind(),
                        };
                        return self.fail(node, rule, violation);
                    }
                }
            }
            (None, _) => {}
        }

        match (node.has_scope(), state.scope) {
            (true, ScopeReq::Forbidden) => {
                return self.fail(node, rule, Violation::UnexpectedScope);
            }
            (false, ScopeReq::Required) => {
                return self.fail(node, rule, Violation::MissingScope);
            }
            _ => {}
        }

        if let Some(handle) = node.data {
            if !state.has_data {
                return self.fail(node, rule, Violation::UnexpectedData { handle });
            }
        }

        MatchResult::Matched
    }

    /// Reports `violation` against `node` and returns `Invalid`.
    fn fail(&mut self, node: &Node, rule: &Rule, violation: Violation) -> MatchResult {
        self.report(node, &rule.name, violation);
        MatchResult::Invalid
    }

    fn report(&mut self, node: &Node, rule: &str, violation: Violation) {
        let diagnostic = CheckDiagnostic::new(node, rule, violation, self.print_width);
        self.reporter.report(diagnostic);
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Checks `tree` against `grammar` with the reporter `options` selects.
///
/// Always active, whatever the build configuration; this is the form test
/// harnesses and tools call. A root kind the grammar does not recognize is
/// `NotApplicable` unless `options.require_root` is set, in which case it is
/// reported as ungrammatical and the result is `Invalid`.
pub fn verify(
    tree: &Node,
    grammar: &Grammar,
    errors: &mut ErrorSink,
    options: &CheckOptions,
) -> MatchResult {
    match options.policy {
        Policy::Immediate => run(tree, grammar, AbortOnError::new(errors), options),
        Policy::Accumulate if options.echo => run(tree, grammar, StderrEcho::new(errors), options),
        Policy::Accumulate => run(tree, grammar, errors, options),
    }
}

fn run<R: Reporter>(tree: &Node, grammar: &Grammar, reporter: R, options: &CheckOptions) -> MatchResult {
    let mut checker = Checker::new(grammar, reporter, options.print_width);
    let result = checker.check_root(tree);

    if result == MatchResult::NotApplicable && options.require_root {
        checker.report(tree, grammar.name(grammar.root()), Violation::Ungrammatical {
            kind: tree.kind(),
        });
        return MatchResult::Invalid;
    }
    result
}

/// Checks a tree against the built-in language grammar after a pass.
///
/// Panics if and only if the tree is invalid. A fragment whose root kind the
/// grammar does not recognize is accepted silently. Compiled to nothing
/// unless debug assertions or the `release-check` feature are enabled.
#[cfg(any(debug_assertions, feature = "release-check"))]
pub fn check_tree(tree: &Node, errors: &mut ErrorSink, options: &CheckOptions) {
    check_tree_with(tree, crate::grammar::lang::language(), errors, options);
}

/// [`check_tree`] against a caller-supplied grammar.
#[cfg(any(debug_assertions, feature = "release-check"))]
pub fn check_tree_with(tree: &Node, grammar: &Grammar, errors: &mut ErrorSink, options: &CheckOptions) {
    let result = verify(tree, grammar, errors, options);
    assert!(
        !result.is_invalid(),
        "malformed {} tree after pass: {} violation(s) recorded",
        tree.kind(),
        errors.len()
    );
}

#[cfg(not(any(debug_assertions, feature = "release-check")))]
#[inline(always)]
pub fn check_tree(_tree: &Node, _errors: &mut ErrorSink, _options: &CheckOptions) {}

#[cfg(not(any(debug_assertions, feature = "release-check")))]
#[inline(always)]
pub fn check_tree_with(
    _tree: &Node,
    _grammar: &Grammar,
    _errors: &mut ErrorSink,
    _options: &CheckOptions,
) {
}

/// Whether [`check_tree`] does anything in this build.
pub const fn enabled() -> bool {
    cfg!(any(debug_assertions, feature = "release-check"))
}
