//! ctxwatch data model.
//!
//! Types shared by the predicate language and the watcher core.
//!
//! - [`value`] - Runtime field values of persisted objects
//! - [`filter`] - Field filter expressions
//! - [`change`] - Change kinds reported by a save and object identities
//! - [`error`] - Model error types

pub mod change;
pub mod error;
pub mod filter;
pub mod value;

pub use change::{ChangeKind, ObjectId};
pub use error::Error;
pub use filter::FilterExpr;
pub use value::Value;
