//! AST module for the checked language
//!
//! The syntax tree is owned and mutated by the parser and the compiler passes;
//! the checker only ever reads it. This module provides the node type, the
//! fixed enumeration of node kinds, a small builder for constructing trees in
//! tests and tooling, and the bounded-width printer used in diagnostics.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source code.
///
/// # Examples
///
/// ```rust
/// use treecheck::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The tag identifying what syntactic construct a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Declarations
    Program,
    Module,
    Use,
    Fun,
    Params,
    Param,

    // Statements
    Seq,
    Let,
    Assign,
    Return,
    Break,
    Continue,

    // Control flow and calls
    If,
    While,
    Call,
    Positional,

    // Operators
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    And,
    Or,
    Not,
    Neg,

    // Atoms
    Int,
    Float,
    String,
    True,
    False,
    Reference,
    Id,

    // Types
    Nominal,
    TypeArgs,
    TupleType,
    FunType,
    TypeList,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Program,
        NodeKind::Module,
        NodeKind::Use,
        NodeKind::Fun,
        NodeKind::Params,
        NodeKind::Param,
        NodeKind::Seq,
        NodeKind::Let,
        NodeKind::Assign,
        NodeKind::Return,
        NodeKind::Break,
        NodeKind::Continue,
        NodeKind::If,
        NodeKind::While,
        NodeKind::Call,
        NodeKind::Positional,
        NodeKind::Add,
        NodeKind::Sub,
        NodeKind::Mul,
        NodeKind::Div,
        NodeKind::Eq,
        NodeKind::Lt,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Neg,
        NodeKind::Int,
        NodeKind::Float,
        NodeKind::String,
        NodeKind::True,
        NodeKind::False,
        NodeKind::Reference,
        NodeKind::Id,
        NodeKind::Nominal,
        NodeKind::TypeArgs,
        NodeKind::TupleType,
        NodeKind::FunType,
        NodeKind::TypeList,
    ];

    /// Returns the lowercase name used in diagnostics and serialized trees.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Module => "module",
            NodeKind::Use => "use",
            NodeKind::Fun => "fun",
            NodeKind::Params => "params",
            NodeKind::Param => "param",
            NodeKind::Seq => "seq",
            NodeKind::Let => "let",
            NodeKind::Assign => "assign",
            NodeKind::Return => "return",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::Call => "call",
            NodeKind::Positional => "positional",
            NodeKind::Add => "add",
            NodeKind::Sub => "sub",
            NodeKind::Mul => "mul",
            NodeKind::Div => "div",
            NodeKind::Eq => "eq",
            NodeKind::Lt => "lt",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Neg => "neg",
            NodeKind::Int => "int",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Reference => "reference",
            NodeKind::Id => "id",
            NodeKind::Nominal => "nominal",
            NodeKind::TypeArgs => "type_args",
            NodeKind::TupleType => "tuple_type",
            NodeKind::FunType => "fun_type",
            NodeKind::TypeList => "type_list",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque auxiliary data attached to a node by a pass.
///
/// The checker only observes whether a handle is present; it never
/// interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataHandle(pub u64);

impl fmt::Display for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A syntax tree node.
///
/// The child sequence and the type field are disjoint: a node's type
/// annotation is never one of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Token text for leaves such as identifiers and literals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_field: Option<Box<Node>>,
    #[serde(default, rename = "scope", skip_serializing_if = "is_false")]
    pub has_scope: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataHandle>,
    #[serde(default)]
    pub span: Span,
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Node {
    /// Creates a bare node of the given kind with no children.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use treecheck::ast::{Node, NodeKind};
    /// let node = Node::new(NodeKind::Break);
    /// assert!(node.children.is_empty());
    /// assert!(!node.has_data());
    /// ```
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            children: Vec::new(),
            type_field: None,
            has_scope: false,
            data: None,
            span: Span::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the child at `index`, if any.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn type_field(&self) -> Option<&Node> {
        self.type_field.as_deref()
    }

    pub fn has_scope(&self) -> bool {
        self.has_scope
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// The short debug rendering of this node: its token text when it has
    /// one, otherwise the kind name.
    ///
    /// ```rust
    /// use treecheck::ast::{Node, NodeKind};
    /// assert_eq!(Node::new(NodeKind::Seq).print(), "seq");
    /// let mut id = Node::new(NodeKind::Id);
    /// id.text = Some("x".into());
    /// assert_eq!(id.print(), "x");
    /// ```
    pub fn print(&self) -> &str {
        self.text.as_deref().unwrap_or_else(|| self.kind.as_str())
    }

    /// Renders the subtree rooted here, wrapping at `width` columns.
    pub fn render(&self, width: usize) -> String {
        print::render(self, width)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print::one_line(self))
    }
}

// ============================================================================
// MODULE EXPORTS
// ============================================================================

pub mod builder;
pub mod print;

pub use builder::NodeBuilder;
