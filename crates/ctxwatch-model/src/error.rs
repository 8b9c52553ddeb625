//! Model error types.

use thiserror::Error;

/// Errors produced while building or decoding model values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A change kind tag did not match any known kind.
    #[error("unknown change kind: {0}")]
    UnknownChangeKind(String),

    /// An object id string was not 32 hex characters.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}
