//! Entity type descriptors.

use serde::{Deserialize, Serialize};

/// Describes an entity type a watcher can register interest in.
///
/// Only the name matters for matching: an object belongs to the entity
/// whose name equals [`ManagedObject::entity`](crate::ManagedObject::entity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityDescriptor {
    name: String,
}

impl EntityDescriptor {
    /// Create a descriptor for the named entity.
    ///
    /// An empty name is accepted here but rejected when the descriptor is
    /// registered with a watcher.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the descriptor carries a usable name.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}
