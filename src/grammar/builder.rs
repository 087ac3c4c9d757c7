//! Two-phase grammar construction.
//!
//! Names are interned the first time they are mentioned, whether as a
//! definition or as a reference, so a rule may point at a group that is
//! declared further down. `build` then checks that every interned name
//! received exactly one definition.
//!
//! ```rust
//! use treecheck::ast::NodeKind;
//! use treecheck::grammar::GrammarBuilder;
//!
//! let mut b = GrammarBuilder::new();
//! b.root(&["expr"]);
//! b.group("expr", &["neg", "int"]);
//! b.rule("neg", &[NodeKind::Neg], |r| {
//!     r.child("expr");
//! });
//! b.rule("int", &[NodeKind::Int], |_| {});
//! let grammar = b.build().unwrap();
//! assert_eq!(grammar.len(), 4);
//! ```

use std::collections::HashMap;

use crate::ast::NodeKind;
use crate::grammar::{
    Clause, Condition, Element, ElementId, Grammar, GrammarError, Group, Quantifier, Rule,
    ScopeReq, Step, TypeReq,
};

/// Name assigned to the root group.
pub const ROOT_NAME: &str = "root";

/// Name table shared between the grammar builder and rule builders.
#[derive(Debug, Default)]
struct Names {
    ids: HashMap<String, ElementId>,
    names: Vec<String>,
    /// The element that first mentioned each name, for undefined-name errors.
    first_referrer: Vec<Option<String>>,
}

impl Names {
    fn intern(&mut self, name: &str, referrer: Option<&str>) -> ElementId {
        if let Some(id) = self.ids.get(name) {
            if self.first_referrer[id.0].is_none() {
                self.first_referrer[id.0] = referrer.map(str::to_string);
            }
            return *id;
        }
        let id = ElementId(self.names.len());
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.first_referrer.push(referrer.map(str::to_string));
        id
    }
}

/// Collects rule and group definitions and resolves them into a [`Grammar`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    names: Names,
    slots: Vec<Option<Element>>,
    root: Option<ElementId>,
    duplicates: Vec<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-declares `name` and returns its handle.
    pub fn declare(&mut self, name: &str) -> ElementId {
        self.names.intern(name, None)
    }

    /// Defines a rule accepting `kinds`; `body` lays out its clauses.
    pub fn rule<F>(&mut self, name: &str, kinds: &[NodeKind], body: F) -> ElementId
    where
        F: FnOnce(&mut RuleBuilder<'_>),
    {
        let id = self.names.intern(name, None);
        let mut builder = RuleBuilder {
            names: &mut self.names,
            owner: name,
            clauses: Vec::new(),
        };
        body(&mut builder);
        let clauses = builder.clauses;

        self.define(
            id,
            Element::Rule(Rule {
                name: name.to_string(),
                kinds: kinds.to_vec(),
                clauses,
            }),
        );
        id
    }

    /// Defines a group whose alternatives are tried in the given order.
    pub fn group(&mut self, name: &str, alternatives: &[&str]) -> ElementId {
        let id = self.names.intern(name, None);
        let alternatives = alternatives
            .iter()
            .map(|alt| self.names.intern(alt, Some(name)))
            .collect();
        self.define(
            id,
            Element::Group(Group {
                name: name.to_string(),
                alternatives,
            }),
        );
        id
    }

    /// Defines the root group, named [`ROOT_NAME`].
    pub fn root(&mut self, alternatives: &[&str]) -> ElementId {
        let id = self.group(ROOT_NAME, alternatives);
        self.root = Some(id);
        id
    }

    fn define(&mut self, id: ElementId, element: Element) {
        if self.slots.len() <= id.0 {
            self.slots.resize_with(id.0 + 1, || None);
        }
        if self.slots[id.0].is_some() {
            self.duplicates.push(element.name().to_string());
            return;
        }
        self.slots[id.0] = Some(element);
    }

    /// Resolves every forward reference and freezes the grammar.
    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        let root = self.root.ok_or(GrammarError::MissingRoot)?;
        if let Some(name) = self.duplicates.first() {
            return Err(GrammarError::Duplicate { name: name.clone() });
        }

        self.slots.resize_with(self.names.names.len(), || None);

        let mut elements = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.into_iter().enumerate() {
            let element = slot.ok_or_else(|| GrammarError::Undefined {
                name: self.names.names[i].clone(),
                referenced_by: self.names.first_referrer[i]
                    .clone()
                    .unwrap_or_else(|| "<declaration>".to_string()),
            })?;
            match &element {
                Element::Rule(rule) if rule.kinds.is_empty() => {
                    return Err(GrammarError::EmptyRule {
                        rule: rule.name.clone(),
                    })
                }
                Element::Group(group) if group.alternatives.is_empty() => {
                    return Err(GrammarError::EmptyGroup {
                        group: group.name.clone(),
                    })
                }
                _ => {}
            }
            elements.push(element);
        }

        if let Some(group) = group_cycle(&elements) {
            return Err(GrammarError::LeftRecursive {
                group: group.to_string(),
            });
        }

        Ok(Grammar::from_parts(elements, self.names.ids, root))
    }
}

/// Finds a group that reaches itself through group alternatives alone.
///
/// Such a group recurses without consuming a node, so checking any kind it
/// does not recognize would never terminate. Cycles through a rule are fine:
/// rules only recurse into children and type fields.
fn group_cycle(elements: &[Element]) -> Option<&str> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    fn visit(elements: &[Element], id: usize, marks: &mut [Mark]) -> Option<usize> {
        let Element::Group(group) = &elements[id] else {
            return None;
        };
        match marks[id] {
            Mark::Active => return Some(id),
            Mark::Done => return None,
            Mark::Unvisited => {}
        }

        marks[id] = Mark::Active;
        for alt in &group.alternatives {
            if let Some(found) = visit(elements, alt.0, marks) {
                return Some(found);
            }
        }
        marks[id] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; elements.len()];
    (0..elements.len())
        .find_map(|id| visit(elements, id, &mut marks))
        .map(|id| elements[id].name())
}

/// Lays out the clauses of one rule body.
///
/// Every method takes the name of a rule or group; names that are not yet
/// defined are forward-declared.
pub struct RuleBuilder<'b> {
    names: &'b mut Names,
    owner: &'b str,
    clauses: Vec<Clause>,
}

impl RuleBuilder<'_> {
    fn step(&mut self, quantifier: Quantifier, target: &str) -> &mut Self {
        let target = self.names.intern(target, Some(self.owner));
        self.clauses.push(Clause::Children(Step { quantifier, target }));
        self
    }

    /// Exactly one child matching `target`.
    pub fn child(&mut self, target: &str) -> &mut Self {
        self.step(Quantifier::One, target)
    }

    pub fn optional(&mut self, target: &str) -> &mut Self {
        self.step(Quantifier::Optional, target)
    }

    pub fn zero_or_more(&mut self, target: &str) -> &mut Self {
        self.step(Quantifier::ZeroOrMore, target)
    }

    pub fn one_or_more(&mut self, target: &str) -> &mut Self {
        self.step(Quantifier::OneOrMore, target)
    }

    /// The node must own a scope.
    pub fn scope(&mut self) -> &mut Self {
        self.clauses.push(Clause::Scope(ScopeReq::Required));
        self
    }

    /// The node may or may not own a scope.
    pub fn maybe_scope(&mut self) -> &mut Self {
        self.clauses.push(Clause::Scope(ScopeReq::Any));
        self
    }

    /// A type field is allowed and must match `target` when present.
    pub fn has_type(&mut self, target: &str) -> &mut Self {
        let id = self.names.intern(target, Some(self.owner));
        self.clauses.push(Clause::Type(TypeReq::Optional(id)));
        self
    }

    /// A type field is mandatory and must match `target`.
    pub fn requires_type(&mut self, target: &str) -> &mut Self {
        let id = self.names.intern(target, Some(self.owner));
        self.clauses.push(Clause::Type(TypeReq::Required(id)));
        self
    }

    pub fn has_data(&mut self) -> &mut Self {
        self.clauses.push(Clause::Data);
        self
    }

    /// Clauses laid out by `body` apply only to nodes satisfying `condition`.
    pub fn when<F>(&mut self, condition: Condition, body: F) -> &mut Self
    where
        F: FnOnce(&mut RuleBuilder<'_>),
    {
        let mut inner = RuleBuilder {
            names: &mut *self.names,
            owner: self.owner,
            clauses: Vec::new(),
        };
        body(&mut inner);
        let then = inner.clauses;
        self.clauses.push(Clause::When { condition, then });
        self
    }
}
