//! spellc-par - recursive-descent parser for the spellc scripting language.
//!
//! Turns a `spellc-lex` token stream into a [`Program`](ast::Program) tree,
//! split by concern into `ast.rs`/`expr.rs`/`stmt.rs`/`types.rs`: `expr.rs`
//! and `stmt.rs` add `impl Parser` blocks rather than re-exporting anything.

pub mod ast;
mod error;
mod expr;
mod parser;
mod stmt;
pub mod types;

pub use error::ParseError;
pub use parser::Parser;

use ast::Program;

/// Convenience entry point: lex and parse `source` in one call.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{ExprKind, Literal, StmtKind};

    #[test]
    fn parses_return_of_number_literal() {
        let program = parse("return 42").unwrap();
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => {
                assert_eq!(expr.kind, ExprKind::Literal(Literal::Number(42.0)));
            }
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_var_decl_with_annotation() {
        let program = parse("let x: number = 1").unwrap();
        match &program.statements[0].kind {
            StmtKind::VarDecl { name, is_const, ann, .. } => {
                assert_eq!(name.as_str(), "x");
                assert!(!is_const);
                assert!(ann.is_some());
            }
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn parses_member_and_call_chain() {
        let program = parse("return casting.spells.filter(s => s.level)").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => {
                assert!(matches!(expr.kind, ExprKind::Call { .. }));
            }
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_arrow_with_parens() {
        let program = parse("return (a, b) => a + b").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => match &expr.kind {
                ExprKind::Arrow { params, is_async, .. } => {
                    assert_eq!(params.len(), 2);
                    assert!(!is_async);
                }
                other => panic!("expected arrow, got {other:?}"),
            },
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_expression_is_not_mistaken_for_arrow() {
        let program = parse("return (1 + 2)").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => {
                assert!(matches!(expr.kind, ExprKind::Binary { .. }));
            }
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_async_arrow() {
        let program = parse("return async x => await x").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => match &expr.kind {
                ExprKind::Arrow { is_async, .. } => assert!(is_async),
                other => panic!("expected arrow, got {other:?}"),
            },
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_await_loop() {
        let program = parse("for await x in items { return x }").unwrap();
        match &program.statements[0].kind {
            StmtKind::For { is_await, .. } => assert!(is_await),
            other => panic!("expected for statement, got {other:?}"),
        }
    }

    #[test]
    fn computed_literal_index_lowers_to_string_key() {
        let program = parse("return arr[0]").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => match &expr.kind {
                ExprKind::Member { property, computed, .. } => {
                    assert!(computed);
                    assert_eq!(property.kind, ExprKind::Literal(Literal::Str(spellc_util::Symbol::intern("0"))));
                }
                other => panic!("expected member, got {other:?}"),
            },
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn complex_computed_index_is_rejected() {
        let err = parse("return arr[i + 1]").unwrap_err();
        assert!(matches!(err, ParseError::ComplexComputedMember { .. }));
    }

    #[test]
    fn object_literal_preserves_field_order() {
        let program = parse("return { b: 1, a: 2 }").unwrap();
        match &program.statements[0].kind {
            StmtKind::Return { value: Some(expr) } => match &expr.kind {
                ExprKind::Object(fields) => {
                    assert_eq!(fields[0].0.as_str(), "b");
                    assert_eq!(fields[1].0.as_str(), "a");
                }
                other => panic!("expected object literal, got {other:?}"),
            },
            other => panic!("expected return statement, got {other:?}"),
        }
    }

    #[test]
    fn empty_program_parses() {
        let program = parse("").unwrap();
        assert!(program.statements.is_empty());
    }
}
