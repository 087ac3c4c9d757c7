//! Consistency checks over a built grammar.
//!
//! A grammar that builds can still be wrong in ways the engine will never
//! notice: elements no tree can reach, and group alternatives that can never
//! be selected because an earlier alternative already recognizes every kind
//! they accept.

use std::collections::HashSet;

use crate::ast::NodeKind;
use crate::grammar::{Element, ElementId, Grammar};

/// A group alternative that is never tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub group: String,
    pub alternative: String,
    /// The earlier alternatives that together cover it.
    pub covered_by: Vec<String>,
}

impl Grammar {
    /// Names of elements not reachable from the root, in declaration order.
    pub fn unreachable(&self) -> Vec<&str> {
        let mut reachable = HashSet::new();
        let mut to_visit = vec![self.root()];

        while let Some(id) = to_visit.pop() {
            if !reachable.insert(id) {
                continue;
            }
            match self.element(id) {
                Element::Rule(rule) => to_visit.extend(rule.references()),
                Element::Group(group) => to_visit.extend(group.alternatives.iter().copied()),
            }
        }

        self.iter()
            .filter(|(id, _)| !reachable.contains(id))
            .map(|(_, element)| element.name())
            .collect()
    }

    /// Group alternatives whose every recognized kind is already claimed by
    /// an earlier alternative of the same group.
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut found = Vec::new();

        for (_, element) in self.iter() {
            let Element::Group(group) = element else {
                continue;
            };

            for (pos, alt) in group.alternatives.iter().enumerate() {
                let kinds = self.kinds_of(*alt);
                if kinds.is_empty() {
                    continue;
                }
                let earlier = &group.alternatives[..pos];
                if !kinds.iter().all(|kind| self.claimed(earlier, *kind)) {
                    continue;
                }
                let covered_by = earlier
                    .iter()
                    .filter(|e| kinds.iter().any(|kind| self.recognizes(**e, *kind)))
                    .map(|e| self.name(*e).to_string())
                    .collect();
                found.push(Shadowed {
                    group: group.name.clone(),
                    alternative: self.name(*alt).to_string(),
                    covered_by,
                });
            }
        }

        found
    }

    fn claimed(&self, earlier: &[ElementId], kind: NodeKind) -> bool {
        earlier.iter().any(|e| self.recognizes(*e, kind))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::NodeKind;
    use crate::grammar::GrammarBuilder;

    #[test]
    fn finds_unreachable_rules() {
        let mut b = GrammarBuilder::new();
        b.root(&["int"]);
        b.rule("int", &[NodeKind::Int], |_| {});
        b.rule("float", &[NodeKind::Float], |_| {});
        let grammar = b.build().unwrap();

        assert_eq!(grammar.unreachable(), vec!["float"]);
    }

    #[test]
    fn type_grammar_counts_as_reachable() {
        let mut b = GrammarBuilder::new();
        b.root(&["int"]);
        b.rule("int", &[NodeKind::Int], |r| {
            r.has_type("nominal");
        });
        b.rule("nominal", &[NodeKind::Nominal], |_| {});
        let grammar = b.build().unwrap();

        assert!(grammar.unreachable().is_empty());
    }

    #[test]
    fn later_alternative_with_same_kinds_is_shadowed() {
        let mut b = GrammarBuilder::new();
        b.root(&["expr"]);
        b.group("expr", &["literal", "int_only", "neg"]);
        b.rule("literal", &[NodeKind::Int, NodeKind::Float], |_| {});
        b.rule("int_only", &[NodeKind::Int], |_| {});
        b.rule("neg", &[NodeKind::Neg, NodeKind::Int], |_| {});
        let grammar = b.build().unwrap();

        let shadowed = grammar.shadowed();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].group, "expr");
        assert_eq!(shadowed[0].alternative, "int_only");
        assert_eq!(shadowed[0].covered_by, vec!["literal".to_string()]);
    }
}
