// Regression tests for the treecheck binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn treecheck() -> Command {
    Command::cargo_bin("treecheck").unwrap()
}

#[test]
fn valid_directory_passes() {
    treecheck()
        .args(["check", "tests/fixtures/valid"])
        .assert()
        .success()
        .stdout(contains("hello.json").and(contains("spin.yaml")))
        .stdout(contains("checked 2 tree(s), 0 failed"));
}

#[test]
fn invalid_tree_fails_with_diagnostic() {
    treecheck()
        .args(["check", "tests/fixtures/invalid/scoped_let.json"])
        .assert()
        .failure()
        .stdout(contains("FAIL"))
        .stderr(contains("Internal error:"))
        .stderr(contains("unexpected scope"))
        .stderr(contains("treecheck::malformed_tree"))
        .stderr(contains("rule `let_decl` rejected this node at 12..21"))
        .stderr(contains("1 of 1 tree(s) failed the check"));
}

#[test]
fn every_invalid_file_is_reported() {
    treecheck()
        .args(["check", "tests/fixtures/invalid"])
        .assert()
        .failure()
        .stderr(contains("unexpected scope").and(contains("expected more")))
        .stderr(contains("2 of 2 tree(s) failed the check"));
}

#[test]
fn fragment_is_skipped_unless_strict() {
    treecheck()
        .args(["check", "tests/fixtures/fragment/add.json"])
        .assert()
        .success()
        .stdout(contains("skip"));

    treecheck()
        .args(["check", "--strict", "tests/fixtures/fragment/add.json"])
        .assert()
        .failure()
        .stderr(contains("kind add is not part of the grammar here"));
}

#[test]
fn config_file_sets_options() {
    treecheck()
        .args([
            "--config",
            "tests/fixtures/strict.yaml",
            "check",
            "tests/fixtures/fragment/add.json",
        ])
        .assert()
        .failure()
        .stderr(contains("not part of the grammar"));
}

#[test]
fn missing_file_is_reported_with_miette() {
    treecheck()
        .args(["check", "tests/fixtures/no_such_tree.json"])
        .assert()
        .failure()
        .stderr(contains("failed to read").or(contains("treecheck::cli::io")));
}

#[test]
fn grammar_is_printed() {
    treecheck()
        .arg("grammar")
        .assert()
        .success()
        .stdout(contains("root = program"))
        .stdout(contains("group expr = binop | unop"))
        .stdout(contains("rule binop [add sub mul div eq lt and or]"));
}

#[test]
fn built_in_grammar_lints_clean() {
    treecheck()
        .arg("lint")
        .assert()
        .success()
        .stdout(contains("grammar is clean"));
}
