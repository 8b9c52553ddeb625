//! Parsed predicate conditions.

use crate::span::{Span, Spanned};

/// A parsed predicate condition, prior to compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Comparison: field op value.
    Comparison {
        field: Spanned<String>,
        op: ComparisonOp,
        value: Spanned<Literal>,
    },
    /// Membership: field in [values].
    In {
        field: Spanned<String>,
        values: Vec<Spanned<Literal>>,
        negated: bool,
    },
    /// Null check: field is null.
    IsNull {
        field: Spanned<String>,
        negated: bool,
    },
    /// Pattern match: field like 'pattern'.
    Like {
        field: Spanned<String>,
        pattern: Spanned<String>,
        negated: bool,
    },
    /// Logical AND of conditions.
    And(Vec<Condition>),
    /// Logical OR of conditions.
    Or(Vec<Condition>),
    /// Logical negation.
    Not(Box<Condition>),
    /// `true` or `false` on its own.
    Const(Spanned<bool>),
}

impl Condition {
    /// Source span covering the whole condition.
    pub fn span(&self) -> Span {
        match self {
            Condition::Comparison { field, value, .. } => field.span.merge(value.span),
            Condition::In { field, values, .. } => values
                .iter()
                .fold(field.span, |span, value| span.merge(value.span)),
            Condition::IsNull { field, .. } => field.span,
            Condition::Like { field, pattern, .. } => field.span.merge(pattern.span),
            Condition::And(parts) | Condition::Or(parts) => parts
                .iter()
                .map(Condition::span)
                .reduce(Span::merge)
                .unwrap_or_default(),
            Condition::Not(inner) => inner.span(),
            Condition::Const(value) => value.span,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal (==).
    Eq,
    /// Not equal (!=).
    Ne,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Le,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Ge,
}

impl ComparisonOp {
    /// Operator as written in source.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

/// A literal value in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
}

impl Literal {
    /// Get a description of the literal type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
        }
    }
}
