//! Core error types.
//!
//! Only recoverable conditions live here. API misuse (a session without a
//! coordinator, an unnamed entity, a save before any registration) panics.

use thiserror::Error;

use crate::notify::SubscriptionId;

/// Recoverable watcher and bus errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Predicate text failed to parse or compile.
    #[error("predicate error: {0}")]
    Predicate(#[from] ctxwatch_lang::LangError),

    /// Model-level error.
    #[error("model error: {0}")]
    Model(#[from] ctxwatch_model::Error),

    /// Unsubscribe with an id the bus does not know.
    #[error("subscription {0} not found")]
    SubscriptionNotFound(SubscriptionId),

    /// The bus refused a new subscription.
    #[error("subscription limit reached ({limit})")]
    SubscriptionLimit { limit: usize },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for the expected shape.
    #[error("config decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
