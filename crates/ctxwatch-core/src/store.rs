//! Persistence coordinator and session handles.
//!
//! These stand in for the persistence stack the watcher observes. The
//! watcher never mutates them; it only asks a session for its coordinator
//! and compares coordinators by identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_COORDINATOR_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity anchor of one persistence stack.
///
/// Two coordinators are the same only if they are the same allocation;
/// equal labels do not make them equal.
#[derive(Debug)]
pub struct Coordinator {
    id: u64,
    label: String,
}

impl Coordinator {
    /// Create a new coordinator.
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_COORDINATOR_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        })
    }

    /// Process-unique numeric id, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Identity comparison.
    pub fn same(a: &Arc<Coordinator>, b: &Arc<Coordinator>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

/// A unit of work whose saves produce [`SaveEvent`](crate::SaveEvent)s.
#[derive(Debug)]
pub struct Session {
    id: u64,
    coordinator: Option<Arc<Coordinator>>,
}

impl Session {
    /// Create a session bound to `coordinator`.
    pub fn new(coordinator: &Arc<Coordinator>) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            coordinator: Some(Arc::clone(coordinator)),
        }
    }

    /// Create a session with no coordinator.
    pub fn detached() -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            coordinator: None,
        }
    }

    /// Process-unique numeric id, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The coordinator owning this session, if any.
    pub fn coordinator(&self) -> Option<&Arc<Coordinator>> {
        self.coordinator.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_identity() {
        let a = Coordinator::new("main");
        let b = Coordinator::new("main");

        assert!(Coordinator::same(&a, &Arc::clone(&a)));
        assert!(!Coordinator::same(&a, &b));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_session_coordinator() {
        let coordinator = Coordinator::new("main");
        let session = Session::new(&coordinator);
        let other = Session::new(&coordinator);

        assert!(Coordinator::same(session.coordinator().unwrap(), &coordinator));
        assert_ne!(session.id(), other.id());
        assert!(Session::detached().coordinator().is_none());
    }
}
