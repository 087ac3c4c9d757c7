//! The built-in language grammar against whole programs and broken fragments.

mod common;

use common::{id, int, nominal, program_with, reference, sample_program, seq};
use treecheck::ast::{NodeBuilder, NodeKind as K};
use treecheck::grammar::lang::language;
use treecheck::{verify, CheckOptions, ErrorSink, MatchResult, Node, Violation};

fn check(tree: &Node) -> (MatchResult, ErrorSink) {
    let mut errors = ErrorSink::new();
    let result = verify(tree, language(), &mut errors, &CheckOptions::quiet());
    (result, errors)
}

fn violation_of(tree: &Node) -> Violation {
    let (result, errors) = check(tree);
    assert_eq!(result, MatchResult::Invalid);
    assert_eq!(errors.len(), 1);
    errors.into_vec().remove(0).violation
}

#[test]
fn sample_program_is_well_formed() {
    let (result, errors) = check(&sample_program());
    assert_eq!(result, MatchResult::Matched, "{:?}", errors.first());
}

#[test]
fn program_must_own_a_scope() {
    let mut tree = sample_program();
    tree.has_scope = false;
    assert_eq!(violation_of(&tree), Violation::MissingScope);
}

#[test]
fn let_must_not_own_a_scope() {
    let stmt = NodeBuilder::new(K::Let).child(id("x")).scoped();
    assert_eq!(violation_of(&program_with(stmt)), Violation::UnexpectedScope);
}

#[test]
fn statement_in_expression_position_is_invalid_kind() {
    let stmt = NodeBuilder::new(K::Add)
        .child(int(1))
        .child(NodeBuilder::new(K::Let).child(id("y")));
    assert_eq!(
        violation_of(&program_with(stmt)),
        Violation::InvalidChildKind {
            index: 1,
            kind: K::Let
        }
    );
}

#[test]
fn only_return_carries_a_value() {
    let ret = NodeBuilder::new(K::Return).child(int(1));
    assert_eq!(check(&program_with(ret)).0, MatchResult::Matched);

    let brk = NodeBuilder::new(K::Break).child(int(1));
    assert!(matches!(
        violation_of(&program_with(brk)),
        Violation::UnexpectedChild { index: 0, .. }
    ));
}

#[test]
fn only_direct_calls_carry_a_target() {
    let args = || NodeBuilder::new(K::Positional);

    let direct = NodeBuilder::new(K::Call)
        .child(reference("f", 1))
        .child(args())
        .data(7);
    assert_eq!(check(&program_with(direct)).0, MatchResult::Matched);

    let callee = NodeBuilder::new(K::Call).child(reference("g", 2)).child(args());
    let indirect = NodeBuilder::new(K::Call).child(callee).child(args()).data(7);
    assert!(matches!(
        violation_of(&program_with(indirect)),
        Violation::UnexpectedData { .. }
    ));
}

#[test]
fn empty_sequence_runs_out_of_children() {
    let stmt = NodeBuilder::new(K::If).child(int(1)).child(seq([]));
    assert_eq!(
        violation_of(&program_with(stmt)),
        Violation::MissingChildren { found: 0 }
    );
}

#[test]
fn tuple_type_needs_two_elements() {
    let pair = NodeBuilder::new(K::TupleType)
        .child(nominal("i64"))
        .child(nominal("bool"));
    let stmt = NodeBuilder::new(K::Let).child(id("p")).child(pair);
    assert_eq!(check(&program_with(stmt)).0, MatchResult::Matched);

    let single = NodeBuilder::new(K::TupleType).child(nominal("i64"));
    let stmt = NodeBuilder::new(K::Let).child(id("p")).typed(single);
    assert_eq!(
        violation_of(&program_with(stmt)),
        Violation::MissingChildren { found: 1 }
    );
}

#[test]
fn literal_with_a_non_type_annotation() {
    let stmt = int(1).typed(int(2));
    assert_eq!(
        violation_of(&program_with(stmt)),
        Violation::InvalidTypeKind { kind: K::Int }
    );
}

#[test]
fn fragment_is_not_applicable() {
    let fragment = NodeBuilder::new(K::Add).child(int(1)).build();
    let (result, errors) = check(&fragment);
    assert_eq!(result, MatchResult::NotApplicable);
    assert!(errors.is_empty());
}

#[test]
fn diagnostic_names_the_rule_and_dumps_the_node() {
    let stmt = NodeBuilder::new(K::Let).child(id("x")).scoped();
    let (_, errors) = check(&program_with(stmt));
    let diagnostic = errors.first().unwrap();
    assert_eq!(diagnostic.rule, "let_decl");
    assert_eq!(diagnostic.kind, K::Let);
    assert!(diagnostic.dump.starts_with("(let"), "{}", diagnostic.dump);
}

#[test]
fn serialized_trees_round_trip_through_the_checker() {
    let tree = sample_program();
    let json = serde_json::to_string(&tree).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);
    assert_eq!(check(&back).0, MatchResult::Matched);
}
