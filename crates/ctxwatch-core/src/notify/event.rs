//! The save notification payload.

use std::sync::Arc;

use ctxwatch_model::ChangeKind;

use crate::object::ObjectSet;
use crate::store::Session;

/// Objects a session committed in one save, grouped by change kind.
///
/// Each change set is optional; an absent set and an empty set are both
/// treated as "nothing of this kind".
#[derive(Debug, Clone, Default)]
pub struct SaveEvent {
    /// The session that performed the save.
    pub source: Option<Arc<Session>>,
    /// Objects inserted by the save.
    pub inserted: Option<ObjectSet>,
    /// Objects updated by the save.
    pub updated: Option<ObjectSet>,
    /// Objects deleted by the save.
    pub deleted: Option<ObjectSet>,
}

impl SaveEvent {
    /// Create an event originating from `session` with no change sets.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            source: Some(session),
            ..Self::default()
        }
    }

    /// Create an event with no source session.
    ///
    /// A watcher receiving such an event panics; this exists so malformed
    /// input can be constructed deliberately.
    pub fn unsourced() -> Self {
        Self::default()
    }

    pub fn with_inserted(self, objects: impl Into<ObjectSet>) -> Self {
        self.with_changes(ChangeKind::Inserted, objects)
    }

    pub fn with_updated(self, objects: impl Into<ObjectSet>) -> Self {
        self.with_changes(ChangeKind::Updated, objects)
    }

    pub fn with_deleted(self, objects: impl Into<ObjectSet>) -> Self {
        self.with_changes(ChangeKind::Deleted, objects)
    }

    /// Attach the change set for `kind`, replacing any previous one.
    pub fn with_changes(mut self, kind: ChangeKind, objects: impl Into<ObjectSet>) -> Self {
        let objects = Some(objects.into());
        match kind {
            ChangeKind::Inserted => self.inserted = objects,
            ChangeKind::Updated => self.updated = objects,
            ChangeKind::Deleted => self.deleted = objects,
        }
        self
    }

    /// The change set for `kind`, if present.
    pub fn changes(&self, kind: ChangeKind) -> Option<&ObjectSet> {
        match kind {
            ChangeKind::Inserted => self.inserted.as_ref(),
            ChangeKind::Updated => self.updated.as_ref(),
            ChangeKind::Deleted => self.deleted.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ManagedObject;
    use crate::store::Coordinator;
    use ctxwatch_model::ObjectId;

    #[test]
    fn test_builders() {
        let coordinator = Coordinator::new("main");
        let session = Arc::new(Session::new(&coordinator));
        let post = ManagedObject::new("Post", ObjectId::from_u64(1));

        let event = SaveEvent::new(Arc::clone(&session))
            .with_inserted(ObjectSet::from_iter([post]))
            .with_deleted(ObjectSet::new());

        assert!(Arc::ptr_eq(event.source.as_ref().unwrap(), &session));
        assert_eq!(event.changes(ChangeKind::Inserted).map(ObjectSet::len), Some(1));
        assert!(event.changes(ChangeKind::Updated).is_none());
        assert!(event.changes(ChangeKind::Deleted).unwrap().is_empty());
    }

    #[test]
    fn test_unsourced() {
        let event = SaveEvent::unsourced();
        assert!(event.source.is_none());
        assert!(ChangeKind::ALL.iter().all(|k| event.changes(*k).is_none()));
    }
}
