//! Lowering of parsed conditions to filter expressions.

use ctxwatch_model::{FilterExpr, Value};

use crate::ast::{ComparisonOp, Condition, Literal};
use crate::error::{CompileError, CompileErrorKind};
use crate::span::Spanned;

/// Compile a parsed condition into a [`FilterExpr`].
///
/// Integer literals become `Int64` and float literals `Float64`; the
/// evaluator widens narrower stored values when comparing, and compares
/// integers with floats numerically.
pub fn compile(condition: Condition) -> Result<FilterExpr, CompileError> {
    match condition {
        Condition::Comparison { field, op, value } => compile_comparison(field, op, value),
        Condition::In {
            field,
            values,
            negated,
        } => {
            let values: Vec<Value> = values.into_iter().map(|v| literal_to_value(v.value)).collect();
            Ok(if negated {
                FilterExpr::not_in_values(field.value, values)
            } else {
                FilterExpr::in_values(field.value, values)
            })
        }
        Condition::IsNull { field, negated } => Ok(if negated {
            FilterExpr::is_not_null(field.value)
        } else {
            FilterExpr::is_null(field.value)
        }),
        Condition::Like {
            field,
            pattern,
            negated,
        } => {
            check_like_pattern(&pattern)?;
            Ok(if negated {
                FilterExpr::not_like(field.value, pattern.value)
            } else {
                FilterExpr::like(field.value, pattern.value)
            })
        }
        Condition::And(parts) => Ok(FilterExpr::And(
            parts.into_iter().map(compile).collect::<Result<_, _>>()?,
        )),
        Condition::Or(parts) => Ok(FilterExpr::Or(
            parts.into_iter().map(compile).collect::<Result<_, _>>()?,
        )),
        Condition::Not(inner) => Ok(compile(*inner)?.negate()),
        Condition::Const(value) => Ok(FilterExpr::Const(value.value)),
    }
}

fn compile_comparison(
    field: Spanned<String>,
    op: ComparisonOp,
    value: Spanned<Literal>,
) -> Result<FilterExpr, CompileError> {
    if value.value == Literal::Null {
        return match op {
            ComparisonOp::Eq => Ok(FilterExpr::is_null(field.value)),
            ComparisonOp::Ne => Ok(FilterExpr::is_not_null(field.value)),
            _ => Err(CompileError::new(
                format!("cannot order-compare `{}` against null with `{}`", field.value, op.symbol()),
                field.span.merge(value.span),
                CompileErrorKind::InvalidLiteral,
            )),
        };
    }

    let v = literal_to_value(value.value);
    Ok(match op {
        ComparisonOp::Eq => FilterExpr::eq(field.value, v),
        ComparisonOp::Ne => FilterExpr::ne(field.value, v),
        ComparisonOp::Lt => FilterExpr::lt(field.value, v),
        ComparisonOp::Le => FilterExpr::le(field.value, v),
        ComparisonOp::Gt => FilterExpr::gt(field.value, v),
        ComparisonOp::Ge => FilterExpr::ge(field.value, v),
    })
}

/// A trailing unpaired backslash can never match anything.
fn check_like_pattern(pattern: &Spanned<String>) -> Result<(), CompileError> {
    let trailing = pattern
        .value
        .chars()
        .rev()
        .take_while(|&c| c == '\\')
        .count();
    if trailing % 2 == 1 {
        return Err(CompileError::new(
            "LIKE pattern ends with an unpaired escape",
            pattern.span,
            CompileErrorKind::InvalidPattern,
        ));
    }
    Ok(())
}

fn literal_to_value(literal: Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(b),
        Literal::Int(i) => Value::Int64(i),
        Literal::Float(f) => Value::Float64(f),
        Literal::String(s) => Value::String(s),
    }
}
