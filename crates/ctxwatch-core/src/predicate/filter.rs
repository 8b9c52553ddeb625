//! Evaluation of field filter expressions against object fields.

use std::cmp::Ordering;

use ctxwatch_model::{FilterExpr, Value};

/// Evaluates [`FilterExpr`]s against a row of field values.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Evaluate `filter` against `row`.
    ///
    /// A comparison on a missing field never matches; `IsNull` treats a
    /// missing field as null.
    pub fn evaluate(filter: &FilterExpr, row: &[(String, Value)]) -> bool {
        match filter {
            FilterExpr::Eq { field, value } => {
                Self::compare_field(row, field, value, Self::values_equal)
            }
            FilterExpr::Ne { field, value } => {
                Self::compare_field(row, field, value, |a, b| !Self::values_equal(a, b))
            }
            FilterExpr::Lt { field, value } => {
                Self::compare_field(row, field, value, |a, b| Self::ordered(a, b, Ordering::is_lt))
            }
            FilterExpr::Le { field, value } => {
                Self::compare_field(row, field, value, |a, b| Self::ordered(a, b, Ordering::is_le))
            }
            FilterExpr::Gt { field, value } => {
                Self::compare_field(row, field, value, |a, b| Self::ordered(a, b, Ordering::is_gt))
            }
            FilterExpr::Ge { field, value } => {
                Self::compare_field(row, field, value, |a, b| Self::ordered(a, b, Ordering::is_ge))
            }
            FilterExpr::In { field, values } => match Self::get_field_value(row, field) {
                Some(fv) => values.iter().any(|v| Self::values_equal(fv, v)),
                None => false,
            },
            FilterExpr::NotIn { field, values } => match Self::get_field_value(row, field) {
                Some(fv) => !values.iter().any(|v| Self::values_equal(fv, v)),
                None => true, // NULL is not in any set
            },
            FilterExpr::IsNull { field } => {
                matches!(Self::get_field_value(row, field), None | Some(Value::Null))
            }
            FilterExpr::IsNotNull { field } => {
                !matches!(Self::get_field_value(row, field), None | Some(Value::Null))
            }
            FilterExpr::Like { field, pattern } => match Self::get_field_value(row, field) {
                Some(Value::String(s)) => Self::like_match(s, pattern),
                _ => false,
            },
            FilterExpr::NotLike { field, pattern } => match Self::get_field_value(row, field) {
                Some(Value::String(s)) => !Self::like_match(s, pattern),
                _ => true,
            },
            FilterExpr::And(filters) => filters.iter().all(|f| Self::evaluate(f, row)),
            FilterExpr::Or(filters) => filters.iter().any(|f| Self::evaluate(f, row)),
            FilterExpr::Not(inner) => !Self::evaluate(inner, row),
            FilterExpr::Const(b) => *b,
        }
    }

    fn get_field_value<'a>(row: &'a [(String, Value)], field: &str) -> Option<&'a Value> {
        row.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    fn compare_field<F>(row: &[(String, Value)], field: &str, value: &Value, comparator: F) -> bool
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        match Self::get_field_value(row, field) {
            Some(fv) => comparator(fv, value),
            None => false,
        }
    }

    fn ordered(a: &Value, b: &Value, test: fn(Ordering) -> bool) -> bool {
        Self::compare_values(a, b).map(test).unwrap_or(false)
    }

    /// Equality with numeric widening across integer and float widths.
    ///
    /// An integer compared with a float is converted to `f64`.
    fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
                a.as_i64() == b.as_i64()
            }
            (Value::Float32(_) | Value::Float64(_), Value::Float32(_) | Value::Float64(_)) => {
                a.as_f64() == b.as_f64()
            }
            (Value::Int32(_) | Value::Int64(_), Value::Float32(_) | Value::Float64(_))
            | (Value::Float32(_) | Value::Float64(_), Value::Int32(_) | Value::Int64(_)) => {
                Self::as_number(a) == Self::as_number(b)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            _ => false,
        }
    }

    fn as_number(value: &Value) -> Option<f64> {
        value.as_f64().or_else(|| value.as_i64().map(|i| i as f64))
    }

    /// Ordering of two values, if they are comparable.
    fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
                Some(a.as_i64()?.cmp(&b.as_i64()?))
            }
            (Value::Float32(_) | Value::Float64(_), Value::Float32(_) | Value::Float64(_)) => {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (Value::Int32(_) | Value::Int64(_), Value::Float32(_) | Value::Float64(_))
            | (Value::Float32(_) | Value::Float64(_), Value::Int32(_) | Value::Int64(_)) => {
                Self::as_number(a)?.partial_cmp(&Self::as_number(b)?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Match a string against a SQL LIKE pattern.
    ///
    /// - `%` matches zero or more characters
    /// - `_` matches exactly one character
    /// - `\` makes the next pattern character literal
    pub fn like_match(value: &str, pattern: &str) -> bool {
        let value: Vec<char> = value.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        Self::like_from(&value, &pattern)
    }

    fn like_from(value: &[char], pattern: &[char]) -> bool {
        match pattern.split_first() {
            None => value.is_empty(),
            Some(('%', rest)) => {
                if rest.is_empty() {
                    return true;
                }
                (0..=value.len()).any(|skip| Self::like_from(&value[skip..], rest))
            }
            Some(('_', rest)) => !value.is_empty() && Self::like_from(&value[1..], rest),
            Some(('\\', rest)) => match (rest.split_first(), value.split_first()) {
                (Some((p, rest)), Some((c, tail))) if p == c => Self::like_from(tail, rest),
                _ => false,
            },
            Some((p, rest)) => match value.split_first() {
                Some((c, tail)) if c == p => Self::like_from(tail, rest),
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(fields: Vec<(&str, Value)>) -> Vec<(String, Value)> {
        fields.into_iter().map(|(n, v)| (n.to_string(), v)).collect()
    }

    #[test]
    fn test_eq_filter() {
        let row = make_row(vec![
            ("name", Value::String("Alice".into())),
            ("age", Value::Int32(30)),
        ]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("name", "Alice"), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::eq("name", "Bob"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("age", 30i32), &row));
    }

    #[test]
    fn test_numeric_widening() {
        let row = make_row(vec![("age", Value::Int32(30)), ("score", Value::Float32(1.5))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("age", 30i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::gt("age", 29i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::le("score", 1.5f64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::eq("age", "30"), &row));
    }

    #[test]
    fn test_integer_and_float_compare() {
        let row = make_row(vec![("price", Value::Float64(10.0)), ("qty", Value::Int32(3))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("price", 10i64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::ne("price", 10i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::lt("price", 11i64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::gt("price", 10i64), &row));
        assert!(FilterEvaluator::evaluate(
            &FilterExpr::in_values("price", vec![Value::Int64(5), Value::Int64(10)]),
            &row
        ));

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("qty", 3.0f64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::gt("qty", 2.5f64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::lt("qty", 2.5f64), &row));
        assert!(FilterEvaluator::evaluate(
            &FilterExpr::not_in_values("qty", vec![Value::Float64(3.5)]),
            &row
        ));
    }

    #[test]
    fn test_comparison_filters() {
        let row = make_row(vec![("score", Value::Int64(75))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::lt("score", 80i64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::lt("score", 75i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::ge("score", 75i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::ne("score", 74i64), &row));
    }

    #[test]
    fn test_incomparable_types_never_match() {
        let row = make_row(vec![("flag", Value::Bool(true))]);
        assert!(!FilterEvaluator::evaluate(&FilterExpr::gt("flag", 0i64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::lt("flag", 0i64), &row));
    }

    #[test]
    fn test_missing_field() {
        let row = make_row(vec![("name", Value::String("Alice".into()))]);

        assert!(!FilterEvaluator::evaluate(&FilterExpr::eq("age", 30i64), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::ne("age", 30i64), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::is_null("age"), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::is_not_null("age"), &row));
        assert!(FilterEvaluator::evaluate(
            &FilterExpr::not_in_values("age", vec![Value::Int64(1)]),
            &row
        ));
    }

    #[test]
    fn test_in_filters() {
        let row = make_row(vec![("status", Value::String("active".into()))]);
        let set = vec![Value::String("active".into()), Value::String("pending".into())];

        assert!(FilterEvaluator::evaluate(&FilterExpr::in_values("status", set.clone()), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::not_in_values("status", set), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::in_values("status", vec![]), &row));
    }

    #[test]
    fn test_null_value() {
        let row = make_row(vec![("deleted_at", Value::Null)]);
        assert!(FilterEvaluator::evaluate(&FilterExpr::is_null("deleted_at"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("deleted_at", Value::Null), &row));
    }

    #[test]
    fn test_compound_filters() {
        let row = make_row(vec![("a", Value::Int64(1)), ("b", Value::Int64(2))]);

        let both = FilterExpr::eq("a", 1i64).and(FilterExpr::eq("b", 2i64));
        let either = FilterExpr::eq("a", 9i64).or(FilterExpr::eq("b", 2i64));
        assert!(FilterEvaluator::evaluate(&both, &row));
        assert!(FilterEvaluator::evaluate(&either, &row));
        assert!(!FilterEvaluator::evaluate(&both.negate(), &row));

        assert!(FilterEvaluator::evaluate(&FilterExpr::And(vec![]), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::Or(vec![]), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::Const(true), &row));
    }

    #[test]
    fn test_like_match() {
        assert!(FilterEvaluator::like_match("hello", "hello"));
        assert!(FilterEvaluator::like_match("hello", "h%"));
        assert!(FilterEvaluator::like_match("hello", "%o"));
        assert!(FilterEvaluator::like_match("hello", "%ll%"));
        assert!(FilterEvaluator::like_match("hello", "h_llo"));
        assert!(FilterEvaluator::like_match("", "%"));
        assert!(!FilterEvaluator::like_match("hello", "h_lo"));
        assert!(!FilterEvaluator::like_match("hello", "world%"));
        assert!(FilterEvaluator::like_match("100%", "100\\%"));
        assert!(!FilterEvaluator::like_match("1000", "100\\%"));
        assert!(FilterEvaluator::like_match("a_b", "a\\_b"));
        assert!(FilterEvaluator::like_match("naïve", "na_ve"));
    }

    #[test]
    fn test_like_on_non_string() {
        let row = make_row(vec![("n", Value::Int64(5))]);
        assert!(!FilterEvaluator::evaluate(&FilterExpr::like("n", "%"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::not_like("n", "%"), &row));
    }
}
