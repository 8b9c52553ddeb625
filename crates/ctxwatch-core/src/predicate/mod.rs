//! Composable interest predicates.
//!
//! A [`Predicate`] is a boolean test over a single [`ManagedObject`]. Leaves
//! test the entity name, evaluate a field [`FilterExpr`], or call a
//! closure; `And`/`Or`/`Not` combine them.

mod filter;

pub use filter::FilterEvaluator;

use std::fmt;
use std::sync::Arc;

use ctxwatch_model::FilterExpr;

use crate::error::Error;
use crate::object::ManagedObject;

/// Closure predicate over an object.
pub type PredicateFn = Arc<dyn Fn(&ManagedObject) -> bool + Send + Sync>;

/// A boolean test over a changed object.
#[derive(Clone)]
pub enum Predicate {
    /// Constant result.
    Always(bool),
    /// The object's entity name equals this name.
    Entity(String),
    /// A field filter over the object's fields.
    Filter(FilterExpr),
    /// Caller-supplied test.
    Func(PredicateFn),
    /// All sub-predicates hold. An empty list holds.
    And(Vec<Predicate>),
    /// At least one sub-predicate holds. An empty list does not hold.
    Or(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Predicate matching every object.
    pub fn always() -> Self {
        Predicate::Always(true)
    }

    /// Predicate matching no object.
    pub fn never() -> Self {
        Predicate::Always(false)
    }

    /// Predicate matching objects of the named entity.
    pub fn entity(name: impl Into<String>) -> Self {
        Predicate::Entity(name.into())
    }

    /// Predicate evaluating a field filter.
    pub fn filter(expr: FilterExpr) -> Self {
        Predicate::Filter(expr)
    }

    /// Predicate calling `f`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ManagedObject) -> bool + Send + Sync + 'static,
    {
        Predicate::Func(Arc::new(f))
    }

    /// Compile predicate text (see `ctxwatch_lang`) into a filter predicate.
    pub fn parse(source: &str) -> Result<Self, Error> {
        Ok(Predicate::Filter(ctxwatch_lang::parse_predicate(source)?))
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Predicate) -> Self {
        let mut parts = match self {
            Predicate::And(parts) => parts,
            p => vec![p],
        };
        match other {
            Predicate::And(more) => parts.extend(more),
            p => parts.push(p),
        }
        Predicate::And(parts)
    }

    /// Disjunction, flattening nested `Or`s.
    pub fn or(self, other: Predicate) -> Self {
        let mut parts = match self {
            Predicate::Or(parts) => parts,
            p => vec![p],
        };
        match other {
            Predicate::Or(more) => parts.extend(more),
            p => parts.push(p),
        }
        Predicate::Or(parts)
    }

    /// Negation.
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate against one object. `And`/`Or` short-circuit left to right.
    pub fn evaluate(&self, object: &ManagedObject) -> bool {
        match self {
            Predicate::Always(b) => *b,
            Predicate::Entity(name) => object.entity == *name,
            Predicate::Filter(expr) => FilterEvaluator::evaluate(expr, &object.fields),
            Predicate::Func(f) => f(object),
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(object)),
            Predicate::Or(parts) => parts.iter().any(|p| p.evaluate(object)),
            Predicate::Not(inner) => !inner.evaluate(object),
        }
    }
}

impl From<FilterExpr> for Predicate {
    fn from(expr: FilterExpr) -> Self {
        Predicate::Filter(expr)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always(b) => f.debug_tuple("Always").field(b).finish(),
            Predicate::Entity(name) => f.debug_tuple("Entity").field(name).finish(),
            Predicate::Filter(expr) => f.debug_tuple("Filter").field(expr).finish(),
            Predicate::Func(_) => f.write_str("Func(..)"),
            Predicate::And(parts) => f.debug_tuple("And").field(parts).finish(),
            Predicate::Or(parts) => f.debug_tuple("Or").field(parts).finish(),
            Predicate::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}
