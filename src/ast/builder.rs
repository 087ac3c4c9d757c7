//! # Node Builder
//!
//! Fluent construction of syntax trees for tooling and tests. Passes build
//! their own trees; this is the shorthand used when a tree has to be written
//! out by hand.
//!
//! ```rust
//! use treecheck::ast::{NodeBuilder, NodeKind};
//! let add = NodeBuilder::new(NodeKind::Add)
//!     .child(NodeBuilder::leaf(NodeKind::Int, "1"))
//!     .child(NodeBuilder::leaf(NodeKind::Int, "2"))
//!     .build();
//! assert_eq!(add.children.len(), 2);
//! ```

use crate::ast::{DataHandle, Node, NodeKind, Span};

/// Builder for a single [`Node`] and, through nesting, whole subtrees.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            node: Node::new(kind),
        }
    }

    /// A childless node carrying token text.
    pub fn leaf(kind: NodeKind, text: impl Into<String>) -> Self {
        Self::new(kind).text(text)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.node.text = Some(text.into());
        self
    }

    /// Appends a child. Accepts either a builder or a finished node.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.node.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.node
            .children
            .extend(children.into_iter().map(Into::into));
        self
    }

    /// Sets the type annotation slot.
    pub fn typed(mut self, type_node: impl Into<Node>) -> Self {
        self.node.type_field = Some(Box::new(type_node.into()));
        self
    }

    /// Marks the node as owning a lexical scope.
    pub fn scoped(mut self) -> Self {
        self.node.has_scope = true;
        self
    }

    pub fn data(mut self, handle: u64) -> Self {
        self.node.data = Some(DataHandle(handle));
        self
    }

    pub fn span(mut self, start: usize, end: usize) -> Self {
        self.node.span = Span { start, end };
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

impl From<NodeBuilder> for Node {
    fn from(builder: NodeBuilder) -> Self {
        builder.build()
    }
}
