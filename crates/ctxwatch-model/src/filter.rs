//! Field filter expressions.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Filter expression evaluated against the fields of a changed object.
///
/// Unlike a wire format this tree is freely recursive: `And`, `Or` and
/// `Not` nest arbitrary sub-expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// Field equals value.
    Eq { field: String, value: Value },
    /// Field not equals value.
    Ne { field: String, value: Value },
    /// Field less than value.
    Lt { field: String, value: Value },
    /// Field less than or equal to value.
    Le { field: String, value: Value },
    /// Field greater than value.
    Gt { field: String, value: Value },
    /// Field greater than or equal to value.
    Ge { field: String, value: Value },
    /// Field is in a set of values.
    In { field: String, values: Vec<Value> },
    /// Field is not in a set of values.
    NotIn { field: String, values: Vec<Value> },
    /// Field is null or absent.
    IsNull { field: String },
    /// Field is present and not null.
    IsNotNull { field: String },
    /// Field matches a LIKE pattern.
    Like { field: String, pattern: String },
    /// Field does not match a LIKE pattern.
    NotLike { field: String, pattern: String },
    /// All sub-expressions must hold. An empty list holds.
    And(Vec<FilterExpr>),
    /// At least one sub-expression must hold. An empty list does not hold.
    Or(Vec<FilterExpr>),
    /// Negation.
    Not(Box<FilterExpr>),
    /// Constant result.
    Const(bool),
}

impl FilterExpr {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal filter.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Le {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal filter.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Ge {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an IN filter.
    pub fn in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpr::In {
            field: field.into(),
            values,
        }
    }

    /// Create a NOT IN filter.
    pub fn not_in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpr::NotIn {
            field: field.into(),
            values,
        }
    }

    /// Create an IS NULL filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNull {
            field: field.into(),
        }
    }

    /// Create an IS NOT NULL filter.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNotNull {
            field: field.into(),
        }
    }

    /// Create a LIKE filter.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterExpr::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Create a NOT LIKE filter.
    pub fn not_like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterExpr::NotLike {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s.
    pub fn and(self, other: FilterExpr) -> Self {
        let mut parts = match self {
            FilterExpr::And(parts) => parts,
            expr => vec![expr],
        };
        match other {
            FilterExpr::And(more) => parts.extend(more),
            expr => parts.push(expr),
        }
        FilterExpr::And(parts)
    }

    /// Disjunction of `self` and `other`, flattening nested `Or`s.
    pub fn or(self, other: FilterExpr) -> Self {
        let mut parts = match self {
            FilterExpr::Or(parts) => parts,
            expr => vec![expr],
        };
        match other {
            FilterExpr::Or(more) => parts.extend(more),
            expr => parts.push(expr),
        }
        FilterExpr::Or(parts)
    }

    /// Negate this expression.
    pub fn negate(self) -> Self {
        FilterExpr::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            FilterExpr::eq("status", "active"),
            FilterExpr::Eq {
                field: "status".into(),
                value: Value::String("active".into()),
            }
        );
        assert_eq!(
            FilterExpr::is_null("deleted_at"),
            FilterExpr::IsNull {
                field: "deleted_at".into()
            }
        );
    }

    #[test]
    fn test_and_flattens() {
        let expr = FilterExpr::eq("a", 1)
            .and(FilterExpr::eq("b", 2))
            .and(FilterExpr::eq("c", 3));

        match expr {
            FilterExpr::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_or_does_not_absorb_and() {
        let expr = FilterExpr::eq("a", 1)
            .and(FilterExpr::eq("b", 2))
            .or(FilterExpr::eq("c", 3));

        match expr {
            FilterExpr::Or(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], FilterExpr::And(_)));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_json_roundtrip_nested() {
        let expr = FilterExpr::gt("age", 18i64).and(FilterExpr::like("name", "A%").negate());
        let json = serde_json::to_string(&expr).unwrap();
        let back: FilterExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
