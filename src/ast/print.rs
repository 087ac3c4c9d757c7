//! Bounded-width s-expression printer for syntax trees.
//!
//! A subtree is printed on one line when it fits in the remaining width,
//! otherwise its head goes on one line and each child is printed on its own
//! line, indented by two columns. The type field, when present, is printed
//! last inside square brackets.

use unicode_width::UnicodeWidthStr;

use crate::ast::Node;

const INDENT: usize = 2;

/// Renders `node` wrapped at `width` display columns. Every line, including
/// the last, ends with a newline.
///
/// ```rust
/// use treecheck::ast::{print, NodeBuilder, NodeKind};
/// let node = NodeBuilder::new(NodeKind::Add)
///     .child(NodeBuilder::leaf(NodeKind::Int, "1"))
///     .child(NodeBuilder::leaf(NodeKind::Int, "2"))
///     .build();
/// assert_eq!(print::render(&node, 80), "(add (int 1) (int 2))\n");
/// assert_eq!(print::render(&node, 10), "(add\n  (int 1)\n  (int 2)\n)\n");
/// ```
pub fn render(node: &Node, width: usize) -> String {
    let mut out = String::new();
    render_into(&mut out, node, 0, width);
    out
}

/// The single-line form of a subtree, ignoring width.
pub fn one_line(node: &Node) -> String {
    if node.children.is_empty() && node.type_field.is_none() && node.text.is_none() {
        return node.kind.as_str().to_string();
    }

    let mut s = String::from("(");
    s.push_str(node.kind.as_str());
    if let Some(text) = &node.text {
        s.push(' ');
        s.push_str(text);
    }
    for child in &node.children {
        s.push(' ');
        s.push_str(&one_line(child));
    }
    if let Some(type_field) = node.type_field() {
        s.push_str(" [");
        s.push_str(&one_line(type_field));
        s.push(']');
    }
    s.push(')');
    s
}

fn render_into(out: &mut String, node: &Node, indent: usize, width: usize) {
    let line = one_line(node);
    let pad = " ".repeat(indent);

    if indent.saturating_add(line.width()) <= width {
        out.push_str(&pad);
        out.push_str(&line);
        out.push('\n');
        return;
    }

    out.push_str(&pad);
    out.push('(');
    out.push_str(node.kind.as_str());
    if let Some(text) = &node.text {
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');

    for child in &node.children {
        render_into(out, child, indent + INDENT, width);
    }

    if let Some(type_field) = node.type_field() {
        let inner_pad = " ".repeat(indent + INDENT);
        out.push_str(&inner_pad);
        out.push_str("[\n");
        render_into(out, type_field, indent + 2 * INDENT, width);
        out.push_str(&inner_pad);
        out.push_str("]\n");
    }

    out.push_str(&pad);
    out.push_str(")\n");
}
