//! # Tree Grammar
//!
//! The declarative description of which trees are well formed. A grammar is a
//! table of named elements, each either a [`Rule`] or a [`Group`], plus a
//! distinguished root group that whole trees are checked against.
//!
//! Rules and groups refer to one another cyclically (statements contain
//! expressions, expressions contain blocks of statements), so elements are
//! addressed by [`ElementId`] handles handed out by name from the
//! [`GrammarBuilder`] before any body is defined. [`GrammarBuilder::build`]
//! resolves every handle and freezes the table; a built [`Grammar`] is
//! immutable and can be shared freely between threads.

pub mod builder;
pub mod lang;
pub mod lint;

use std::collections::HashMap;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{Node, NodeKind};

pub use builder::{GrammarBuilder, RuleBuilder};

// =====================
// Core Data Structures
// =====================

/// Handle to a rule or group inside a [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Repetition constraint applied to a run of sibling children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Exactly one.
    One,
    /// Zero or one.
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    /// Inclusive `(min, max)` bounds; `usize::MAX` stands for unbounded.
    pub fn bounds(self) -> (usize, usize) {
        match self {
            Quantifier::One => (1, 1),
            Quantifier::Optional => (0, 1),
            Quantifier::ZeroOrMore => (0, usize::MAX),
            Quantifier::OneOrMore => (1, usize::MAX),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quantifier::One => "child",
            Quantifier::Optional => "optional",
            Quantifier::ZeroOrMore => "zero_or_more",
            Quantifier::OneOrMore => "one_or_more",
        }
    }
}

/// One matching step of a child pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub quantifier: Quantifier,
    pub target: ElementId,
}

/// Whether a node may, must, or must not own a lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeReq {
    #[default]
    Forbidden,
    Required,
    Any,
}

/// Constraint on the type-field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeReq {
    #[default]
    Forbidden,
    /// A type field may be present and, when it is, must satisfy the element.
    Optional(ElementId),
    /// A type field must be present and satisfy the element.
    Required(ElementId),
}

/// Guard for a conditional section of a rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The node itself has one of these kinds.
    KindIs(Vec<NodeKind>),
    /// The child at `index` exists and has one of these kinds.
    ChildKindIs { index: usize, kinds: Vec<NodeKind> },
}

impl Condition {
    pub fn kind_is(kinds: &[NodeKind]) -> Self {
        Condition::KindIs(kinds.to_vec())
    }

    pub fn child_is(index: usize, kinds: &[NodeKind]) -> Self {
        Condition::ChildKindIs {
            index,
            kinds: kinds.to_vec(),
        }
    }

    pub fn holds(&self, node: &Node) -> bool {
        match self {
            Condition::KindIs(kinds) => kinds.contains(&node.kind()),
            Condition::ChildKindIs { index, kinds } => node
                .child(*index)
                .is_some_and(|child| kinds.contains(&child.kind())),
        }
    }
}

/// A single entry of a rule body, evaluated in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Children(Step),
    Scope(ScopeReq),
    Type(TypeReq),
    /// Permit a data handle.
    Data,
    When {
        condition: Condition,
        then: Vec<Clause>,
    },
}

/// A named predicate over nodes of a set of kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub kinds: Vec<NodeKind>,
    pub clauses: Vec<Clause>,
}

impl Rule {
    pub fn accepts(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Elements referenced from this rule: step targets and type grammars.
    pub fn references(&self) -> Vec<ElementId> {
        fn walk(clauses: &[Clause], out: &mut Vec<ElementId>) {
            for clause in clauses {
                match clause {
                    Clause::Children(step) => out.push(step.target),
                    Clause::Type(TypeReq::Optional(id) | TypeReq::Required(id)) => out.push(*id),
                    Clause::When { then, .. } => walk(then, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.clauses, &mut out);
        out
    }
}

/// An ordered, first-recognizer-wins alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub alternatives: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Rule(Rule),
    Group(Group),
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::Rule(rule) => &rule.name,
            Element::Group(group) => &group.name,
        }
    }
}

/// Errors raised while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    #[error("'{name}' is referenced by '{referenced_by}' but never defined")]
    #[diagnostic(code(treecheck::grammar::undefined))]
    Undefined { name: String, referenced_by: String },

    #[error("'{name}' is defined more than once")]
    #[diagnostic(code(treecheck::grammar::duplicate))]
    Duplicate { name: String },

    #[error("grammar has no root group")]
    #[diagnostic(
        code(treecheck::grammar::missing_root),
        help("declare the entry alternatives with `GrammarBuilder::root`")
    )]
    MissingRoot,

    #[error("rule '{rule}' accepts no node kinds")]
    #[diagnostic(code(treecheck::grammar::empty_rule))]
    EmptyRule { rule: String },

    #[error("group '{group}' has no alternatives")]
    #[diagnostic(code(treecheck::grammar::empty_group))]
    EmptyGroup { group: String },

    #[error("group '{group}' reaches itself without passing through a rule")]
    #[diagnostic(
        code(treecheck::grammar::left_recursive),
        help("every cycle between groups must pass through a rule that matches a child")
    )]
    LeftRecursive { group: String },
}

/// An immutable, fully resolved tree grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    elements: Vec<Element>,
    index: HashMap<String, ElementId>,
    root: ElementId,
}

// =====================
// Public API
// =====================

impl Grammar {
    pub(crate) fn from_parts(
        elements: Vec<Element>,
        index: HashMap<String, ElementId>,
        root: ElementId,
    ) -> Self {
        Self {
            elements,
            index,
            root,
        }
    }

    /// The group whole trees are checked against.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn lookup(&self, name: &str) -> Option<ElementId> {
        self.index.get(name).copied()
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn name(&self, id: ElementId) -> &str {
        self.element(id).name()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, element)| (ElementId(i), element))
    }

    /// Whether `id` would recognize (not necessarily accept) a node of `kind`.
    pub fn recognizes(&self, id: ElementId, kind: NodeKind) -> bool {
        let mut visiting = Vec::new();
        self.recognizes_inner(id, kind, &mut visiting)
    }

    fn recognizes_inner(&self, id: ElementId, kind: NodeKind, visiting: &mut Vec<ElementId>) -> bool {
        match self.element(id) {
            Element::Rule(rule) => rule.accepts(kind),
            Element::Group(group) => {
                if visiting.contains(&id) {
                    return false;
                }
                visiting.push(id);
                let found = group
                    .alternatives
                    .iter()
                    .any(|alt| self.recognizes_inner(*alt, kind, visiting));
                visiting.pop();
                found
            }
        }
    }

    /// Every kind `id` recognizes, in [`NodeKind::ALL`] order.
    pub fn kinds_of(&self, id: ElementId) -> Vec<NodeKind> {
        NodeKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.recognizes(id, *kind))
            .collect()
    }
}

// =====================
// Rendering
// =====================

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, element) in self.iter() {
            if id == self.root {
                write!(f, "root")?;
            } else {
                match element {
                    Element::Rule(_) => write!(f, "rule {}", element.name())?,
                    Element::Group(_) => write!(f, "group {}", element.name())?,
                }
            }
            match element {
                Element::Group(group) => {
                    let alts: Vec<&str> = group.alternatives.iter().map(|a| self.name(*a)).collect();
                    writeln!(f, " = {}", alts.join(" | "))?;
                }
                Element::Rule(rule) => {
                    let kinds: Vec<&str> = rule.kinds.iter().map(NodeKind::as_str).collect();
                    writeln!(f, " [{}]", kinds.join(" "))?;
                    self.fmt_clauses(f, &rule.clauses, 1)?;
                }
            }
        }
        Ok(())
    }
}

impl Grammar {
    fn fmt_clauses(&self, f: &mut fmt::Formatter<'_>, clauses: &[Clause], depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        for clause in clauses {
            match clause {
                Clause::Children(step) => {
                    writeln!(f, "{pad}{} {}", step.quantifier.as_str(), self.name(step.target))?
                }
                Clause::Scope(ScopeReq::Required) => writeln!(f, "{pad}scope")?,
                Clause::Scope(ScopeReq::Any) => writeln!(f, "{pad}maybe_scope")?,
                Clause::Scope(ScopeReq::Forbidden) => writeln!(f, "{pad}no_scope")?,
                Clause::Type(TypeReq::Optional(id)) => writeln!(f, "{pad}has_type {}", self.name(*id))?,
                Clause::Type(TypeReq::Required(id)) => {
                    writeln!(f, "{pad}requires_type {}", self.name(*id))?
                }
                Clause::Type(TypeReq::Forbidden) => writeln!(f, "{pad}no_type")?,
                Clause::Data => writeln!(f, "{pad}has_data")?,
                Clause::When { condition, then } => {
                    match condition {
                        Condition::KindIs(kinds) => {
                            let kinds: Vec<&str> = kinds.iter().map(NodeKind::as_str).collect();
                            writeln!(f, "{pad}when kind in [{}]", kinds.join(" "))?
                        }
                        Condition::ChildKindIs { index, kinds } => {
                            let kinds: Vec<&str> = kinds.iter().map(NodeKind::as_str).collect();
                            writeln!(f, "{pad}when child {index} in [{}]", kinds.join(" "))?
                        }
                    }
                    self.fmt_clauses(f, then, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}
