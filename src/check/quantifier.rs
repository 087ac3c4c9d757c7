//! Quantified child matching.
//!
//! A step consumes a run of leading children, greedily and without
//! backtracking: each child must match the step's target, and consumption
//! stops at the step's maximum, at the first child the target does not
//! recognize, or at the end of the child list. Grammars are written so that
//! the alternatives at any position are unambiguous, which is what makes the
//! greedy walk sound.

use super::{Checker, MatchResult};
use crate::ast::Node;
use crate::grammar::{Rule, Step};
use crate::report::{Reporter, Violation};

impl<R: Reporter> Checker<'_, R> {
    /// Consumes children of `node` starting at `*cursor` according to `step`,
    /// advancing the cursor past every matched child.
    ///
    /// Returns `Matched` when at least the step's minimum was consumed, and
    /// `Invalid` (already reported) otherwise or when a child is invalid.
    pub(super) fn consume(
        &mut self,
        node: &Node,
        rule: &Rule,
        step: Step,
        cursor: &mut usize,
    ) -> MatchResult {
        let (min, max) = step.quantifier.bounds();
        let mut found = 0;

        while found < max {
            let Some(child) = node.child(*cursor) else {
                break;
            };

            match self.check(child, step.target) {
                MatchResult::Invalid => return MatchResult::Invalid,
                MatchResult::NotApplicable => break,
                MatchResult::Matched => {
                    *cursor += 1;
                    found += 1;
                }
            }
        }

        if found >= min {
            return MatchResult::Matched;
        }

        let violation = match node.child(*cursor) {
            None => Violation::MissingChildren { found: *cursor },
            Some(child) => Violation::InvalidChildKind {
                index: *cursor,
                kind: child.kind(),
            },
        };
        self.fail(node, rule, violation)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{NodeBuilder, NodeKind};
    use crate::check::{Checker, MatchResult};
    use crate::grammar::{Grammar, GrammarBuilder};
    use crate::report::{ErrorSink, Violation};

    /// A grammar whose root rule `list` is laid out by `body`, with `int` as
    /// the only other rule.
    fn grammar_with(body: fn(&mut crate::grammar::RuleBuilder<'_>)) -> Grammar {
        let mut b = GrammarBuilder::new();
        b.root(&["list"]);
        b.rule("list", &[NodeKind::Positional], body);
        b.rule("int", &[NodeKind::Int], |_| {});
        b.build().unwrap()
    }

    fn run(grammar: &Grammar, ints: usize, extra: Option<NodeKind>) -> (MatchResult, ErrorSink) {
        let mut node = NodeBuilder::new(NodeKind::Positional);
        for i in 0..ints {
            node = node.child(NodeBuilder::leaf(NodeKind::Int, i.to_string()));
        }
        if let Some(kind) = extra {
            node = node.child(NodeBuilder::new(kind));
        }
        let node = node.build();

        let mut sink = ErrorSink::new();
        let result = Checker::new(grammar, &mut sink, 80).check_root(&node);
        (result, sink)
    }

    #[test]
    fn optional_takes_zero_or_one() {
        let g = grammar_with(|r| {
            r.optional("int");
        });
        assert_eq!(run(&g, 0, None).0, MatchResult::Matched);
        assert_eq!(run(&g, 1, None).0, MatchResult::Matched);

        let (result, sink) = run(&g, 2, None);
        assert_eq!(result, MatchResult::Invalid);
        assert!(matches!(
            sink.first().map(|d| &d.violation),
            Some(Violation::UnexpectedChild { index: 1, .. })
        ));
    }

    #[test]
    fn one_or_more_needs_one() {
        let g = grammar_with(|r| {
            r.one_or_more("int");
        });
        let (result, sink) = run(&g, 0, None);
        assert_eq!(result, MatchResult::Invalid);
        assert_eq!(
            sink.first().map(|d| d.violation.clone()),
            Some(Violation::MissingChildren { found: 0 })
        );
        assert_eq!(run(&g, 5, None).0, MatchResult::Matched);
    }

    #[test]
    fn rejected_child_below_minimum_is_invalid_kind() {
        let g = grammar_with(|r| {
            r.child("int").child("int");
        });
        let (result, sink) = run(&g, 1, Some(NodeKind::Float));
        assert_eq!(result, MatchResult::Invalid);
        assert_eq!(
            sink.first().map(|d| d.violation.clone()),
            Some(Violation::InvalidChildKind {
                index: 1,
                kind: NodeKind::Float
            })
        );
    }

    #[test]
    fn optional_step_leaves_unrecognized_child_for_the_next_step() {
        let mut b = GrammarBuilder::new();
        b.root(&["list"]);
        b.rule("list", &[NodeKind::Positional], |r| {
            r.optional("int").child("float");
        });
        b.rule("int", &[NodeKind::Int], |_| {});
        b.rule("float", &[NodeKind::Float], |_| {});
        let g = b.build().unwrap();

        assert_eq!(run(&g, 0, Some(NodeKind::Float)).0, MatchResult::Matched);
        assert_eq!(run(&g, 1, Some(NodeKind::Float)).0, MatchResult::Matched);
        assert_eq!(run(&g, 2, Some(NodeKind::Float)).0, MatchResult::Invalid);
    }
}
