//! Per-kind subsets of a save matched by a watcher's interest.

use std::collections::btree_map;
use std::collections::BTreeMap;

use ctxwatch_model::ChangeKind;

use crate::notify::SaveEvent;
use crate::object::ObjectSet;
use crate::predicate::Predicate;

/// The objects of one save that matched a watcher's interest, by kind.
///
/// Only kinds with at least one match are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Impact {
    changes: BTreeMap<ChangeKind, ObjectSet>,
}

impl Impact {
    /// Filter every change set of `event` through `predicate`.
    ///
    /// Kinds are processed independently; an object reported under two
    /// kinds may match under both.
    pub fn compute(predicate: &Predicate, event: &SaveEvent) -> Self {
        let changes = ChangeKind::ALL
            .iter()
            .filter_map(|&kind| {
                let matched = event.changes(kind)?.filter(predicate);
                (!matched.is_empty()).then_some((kind, matched))
            })
            .collect();
        Self { changes }
    }

    /// Matched objects of `kind`.
    pub fn get(&self, kind: ChangeKind) -> Option<&ObjectSet> {
        self.changes.get(&kind)
    }

    /// Matched inserted objects.
    pub fn inserted(&self) -> Option<&ObjectSet> {
        self.get(ChangeKind::Inserted)
    }

    /// Matched updated objects.
    pub fn updated(&self) -> Option<&ObjectSet> {
        self.get(ChangeKind::Updated)
    }

    /// Matched deleted objects.
    pub fn deleted(&self) -> Option<&ObjectSet> {
        self.get(ChangeKind::Deleted)
    }

    /// Whether any object of `kind` matched.
    pub fn contains(&self, kind: ChangeKind) -> bool {
        self.changes.contains_key(&kind)
    }

    /// Kinds with matches, in `ChangeKind` order.
    pub fn kinds(&self) -> impl Iterator<Item = ChangeKind> + '_ {
        self.changes.keys().copied()
    }

    /// Number of kinds with matches.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Total matched objects across all kinds.
    pub fn total_objects(&self) -> usize {
        self.changes.values().map(ObjectSet::len).sum()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate over `(kind, objects)` pairs in `ChangeKind` order.
    pub fn iter(&self) -> btree_map::Iter<'_, ChangeKind, ObjectSet> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a Impact {
    type Item = (&'a ChangeKind, &'a ObjectSet);
    type IntoIter = btree_map::Iter<'a, ChangeKind, ObjectSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
