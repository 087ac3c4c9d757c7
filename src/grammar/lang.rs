//! The grammar of the compiler's own language.
//!
//! One rule per node kind or small family of kinds, grouped into statements,
//! expressions and types. Built once on first use and shared by every check.

use once_cell::sync::Lazy;

use crate::ast::NodeKind as K;
use crate::grammar::{Condition, Grammar, GrammarBuilder, GrammarError};

static LANGUAGE: Lazy<Grammar> = Lazy::new(|| match build() {
    Ok(grammar) => grammar,
    Err(e) => panic!("built-in tree grammar is inconsistent: {e}"),
});

/// The built-in language grammar.
pub fn language() -> &'static Grammar {
    &LANGUAGE
}

/// Builds a fresh copy of the language grammar.
pub fn build() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new();

    g.root(&["program"]);

    // Declarations
    g.rule("program", &[K::Program], |r| {
        r.zero_or_more("module").scope();
    });
    g.rule("module", &[K::Module], |r| {
        r.zero_or_more("use_decl")
            .zero_or_more("fun")
            .scope()
            .has_data();
    });
    g.rule("use_decl", &[K::Use], |r| {
        r.optional("id").child("path");
    });
    g.rule("path", &[K::String], |_| {});
    g.rule("fun", &[K::Fun], |r| {
        r.child("id")
            .child("params")
            .optional("type")
            .child("seq")
            .scope()
            .has_data();
    });
    g.rule("params", &[K::Params], |r| {
        r.zero_or_more("param");
    });
    g.rule("param", &[K::Param], |r| {
        r.child("id").child("type").optional("expr").has_type("type");
    });

    // Statements
    g.group("statement", &["let_decl", "assign", "jump", "expr"]);
    g.rule("seq", &[K::Seq], |r| {
        r.one_or_more("statement").maybe_scope().has_type("type");
    });
    g.rule("let_decl", &[K::Let], |r| {
        r.child("id").optional("type").has_type("type");
    });
    g.rule("assign", &[K::Assign], |r| {
        r.child("expr").child("expr").has_type("type");
    });
    g.rule("jump", &[K::Return, K::Break, K::Continue], |r| {
        r.when(Condition::kind_is(&[K::Return]), |r| {
            r.optional("expr");
        });
    });

    // Expressions
    g.group(
        "expr",
        &[
            "binop",
            "unop",
            "call",
            "if_expr",
            "while_loop",
            "seq",
            "literal",
            "reference",
        ],
    );
    g.rule(
        "binop",
        &[K::Add, K::Sub, K::Mul, K::Div, K::Eq, K::Lt, K::And, K::Or],
        |r| {
            r.child("expr").child("expr").has_type("type");
        },
    );
    g.rule("unop", &[K::Not, K::Neg], |r| {
        r.child("expr").has_type("type");
    });
    g.rule("call", &[K::Call], |r| {
        // A direct call may carry its resolved target.
        r.when(Condition::child_is(0, &[K::Reference]), |r| {
            r.has_data();
        })
        .child("expr")
        .child("positional")
        .has_type("type");
    });
    g.rule("positional", &[K::Positional], |r| {
        r.zero_or_more("expr");
    });
    g.rule("if_expr", &[K::If], |r| {
        r.child("expr")
            .child("seq")
            .optional("seq")
            .maybe_scope()
            .has_type("type");
    });
    g.rule("while_loop", &[K::While], |r| {
        r.child("seq")
            .child("seq")
            .optional("seq")
            .maybe_scope()
            .has_type("type");
    });
    g.rule(
        "literal",
        &[K::Int, K::Float, K::String, K::True, K::False],
        |r| {
            r.has_type("type");
        },
    );
    g.rule("reference", &[K::Reference], |r| {
        r.child("id").has_type("type").has_data();
    });
    g.rule("id", &[K::Id], |_| {});

    // Types
    g.group("type", &["nominal", "tuple_type", "fun_type"]);
    g.rule("nominal", &[K::Nominal], |r| {
        r.child("id").optional("type_args").has_data();
    });
    g.rule("type_args", &[K::TypeArgs], |r| {
        r.one_or_more("type");
    });
    g.rule("tuple_type", &[K::TupleType], |r| {
        r.child("type").one_or_more("type");
    });
    g.rule("fun_type", &[K::FunType], |r| {
        r.child("type_list").child("type");
    });
    g.rule("type_list", &[K::TypeList], |r| {
        r.zero_or_more("type");
    });

    g.build()
}
