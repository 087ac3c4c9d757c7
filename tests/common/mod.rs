//! # Shared Test Trees
//!
//! Builders for well-formed language trees, and a loader for the serialized
//! trees under `tests/fixtures`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use treecheck::ast::{Node, NodeBuilder, NodeKind as K};
use walkdir::WalkDir;

pub const FIXTURES: &str = "tests/fixtures";

pub fn id(name: &str) -> NodeBuilder {
    NodeBuilder::leaf(K::Id, name)
}

pub fn int(n: i64) -> NodeBuilder {
    NodeBuilder::leaf(K::Int, n.to_string())
}

pub fn nominal(name: &str) -> NodeBuilder {
    NodeBuilder::new(K::Nominal).child(id(name))
}

/// A resolved reference to `name`.
pub fn reference(name: &str, handle: u64) -> NodeBuilder {
    NodeBuilder::new(K::Reference).child(id(name)).data(handle)
}

pub fn seq<I>(statements: I) -> NodeBuilder
where
    I: IntoIterator<Item = NodeBuilder>,
{
    NodeBuilder::new(K::Seq).children(statements)
}

/// `fun main(argc: i64) -> i64 { ... }` in a module that imports `std`.
pub fn sample_program() -> Node {
    let body = seq([
        NodeBuilder::new(K::Let)
            .child(id("x"))
            .child(nominal("i64"))
            .typed(nominal("i64")),
        NodeBuilder::new(K::Assign)
            .child(reference("x", 3))
            .child(
                NodeBuilder::new(K::Add)
                    .child(reference("argc", 2))
                    .child(int(1))
                    .typed(nominal("i64")),
            ),
        NodeBuilder::new(K::If)
            .child(
                NodeBuilder::new(K::Lt)
                    .child(reference("x", 3))
                    .child(int(10)),
            )
            .child(seq([NodeBuilder::new(K::Return).child(reference("x", 3))]))
            .child(seq([NodeBuilder::new(K::Break)]).scoped()),
        NodeBuilder::new(K::Call)
            .child(reference("print", 5))
            .child(NodeBuilder::new(K::Positional).child(NodeBuilder::leaf(K::String, "done")))
            .data(4),
        NodeBuilder::new(K::Return).child(int(0)),
    ]);

    let main = NodeBuilder::new(K::Fun)
        .child(id("main"))
        .child(
            NodeBuilder::new(K::Params)
                .child(NodeBuilder::new(K::Param).child(id("argc")).child(nominal("i64"))),
        )
        .child(nominal("i64"))
        .child(body)
        .scoped()
        .data(1);

    let module = NodeBuilder::new(K::Module)
        .child(NodeBuilder::new(K::Use).child(NodeBuilder::leaf(K::String, "std")))
        .child(main)
        .scoped()
        .data(0);

    NodeBuilder::new(K::Program).child(module).scoped().build()
}

/// Wraps one statement as the whole body of `main`.
pub fn program_with(statement: NodeBuilder) -> Node {
    let main = NodeBuilder::new(K::Fun)
        .child(id("main"))
        .child(NodeBuilder::new(K::Params))
        .child(seq([statement]))
        .scoped();
    let module = NodeBuilder::new(K::Module).child(main).scoped();
    NodeBuilder::new(K::Program).child(module).scoped().build()
}

/// Every `.json` fixture under `tests/fixtures/<dir>`, sorted by name.
pub fn fixture_files(dir: &str) -> Vec<PathBuf> {
    WalkDir::new(Path::new(FIXTURES).join(dir))
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
        .map(|e| e.into_path())
        .collect()
}

pub fn load_fixture(path: &Path) -> Node {
    let source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&source)
        .unwrap_or_else(|e| panic!("cannot parse {}: {e}", path.display()))
}
