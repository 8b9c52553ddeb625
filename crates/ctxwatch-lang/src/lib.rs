//! ctxwatch predicate language.
//!
//! A small text syntax for the interest predicates a watcher registers,
//! compiled down to [`ctxwatch_model::FilterExpr`].
//!
//! # Syntax
//!
//! ```text
//! status == "active"
//! age >= 18 && name like 'A%'
//! role in ["admin", "owner"] or archived == true
//! !(deleted_at is not null)
//! priority not in [1, 2]
//! true
//! ```
//!
//! `&&`/`and` binds tighter than `||`/`or`; `!`/`not` binds tightest.
//! Strings may be single- or double-quoted.
//!
//! # Usage
//!
//! ```rust
//! use ctxwatch_lang::parse_predicate;
//! use ctxwatch_model::FilterExpr;
//!
//! let expr = parse_predicate(r#"status == "active""#).unwrap();
//! assert_eq!(expr, FilterExpr::eq("status", "active"));
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{ComparisonOp, Condition, Literal};
pub use compiler::compile;
pub use error::{CompileError, CompileErrorKind, LangError, ParseError};
pub use lexer::{tokenize, Lexer, SpannedToken, Token};
pub use parser::{parse, Parser};
pub use span::{Span, Spanned};

use ctxwatch_model::FilterExpr;

/// Parse and compile predicate text in one step.
pub fn parse_predicate(source: &str) -> Result<FilterExpr, LangError> {
    let condition = parse(source)?;
    Ok(compile(condition)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxwatch_model::Value;

    #[test]
    fn test_parse_predicate() {
        let expr = parse_predicate("age > 18 and name like 'A%'").unwrap();
        assert_eq!(
            expr,
            FilterExpr::And(vec![
                FilterExpr::gt("age", Value::Int64(18)),
                FilterExpr::like("name", "A%"),
            ])
        );
    }

    #[test]
    fn test_parse_predicate_errors_keep_spans() {
        let source = "age > 18 && name ~ 'A%'";
        let err = parse_predicate(source).unwrap_err();
        assert!(matches!(err, LangError::Parse(_)));
        assert_eq!(err.span(), Span::new(17, 18));
        assert!(err.format_with_source(source).contains("line 1:18"));

        let err = parse_predicate("age >= null").unwrap_err();
        assert!(matches!(err, LangError::Compile(_)));
    }
}
