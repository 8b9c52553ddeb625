//! Persisted objects as seen by a save, and the sets a save reports them in.

use std::collections::hash_map;
use std::collections::HashMap;
use std::sync::Arc;

use ctxwatch_model::{ObjectId, Value};

use crate::predicate::Predicate;

/// A persisted object carried by a save event.
///
/// Fields are kept as an ordered list of `(name, value)` pairs, the same
/// row shape the filter evaluator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedObject {
    /// Identity of the object within its store.
    pub id: ObjectId,
    /// Name of the entity type this object is an instance of.
    pub entity: String,
    /// Field values.
    pub fields: Vec<(String, Value)>,
}

impl ManagedObject {
    /// Create an object with no fields.
    pub fn new(entity: impl Into<String>, id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            entity: entity.into(),
            fields: Vec::new(),
        }
    }

    /// Set a field, replacing any previous value with the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Look up a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }
}

/// An unordered collection of distinct objects, keyed by [`ObjectId`].
///
/// Objects are shared behind `Arc` so filtering a set into an impact does
/// not copy field data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSet {
    objects: HashMap<ObjectId, Arc<ManagedObject>>,
}

impl ObjectSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object. Returns `false` and leaves the set unchanged if an
    /// object with the same id is already present.
    pub fn insert(&mut self, object: impl Into<Arc<ManagedObject>>) -> bool {
        let object = object.into();
        match self.objects.entry(object.id) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(slot) => {
                slot.insert(object);
                true
            }
        }
    }

    /// Check whether an object with this id is present.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Get an object by id.
    pub fn get(&self, id: &ObjectId) -> Option<&Arc<ManagedObject>> {
        self.objects.get(id)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ManagedObject>> {
        self.objects.values()
    }

    /// Ids of all objects, sorted.
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort();
        ids
    }

    /// The subset of objects satisfying `predicate`.
    pub fn filter(&self, predicate: &Predicate) -> ObjectSet {
        self.objects
            .iter()
            .filter(|(_, object)| predicate.evaluate(object))
            .map(|(id, object)| (*id, Arc::clone(object)))
            .collect::<HashMap<_, _>>()
            .into()
    }
}

impl From<HashMap<ObjectId, Arc<ManagedObject>>> for ObjectSet {
    fn from(objects: HashMap<ObjectId, Arc<ManagedObject>>) -> Self {
        Self { objects }
    }
}

impl<T: Into<Arc<ManagedObject>>> FromIterator<T> for ObjectSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = ObjectSet::new();
        for object in iter {
            set.insert(object);
        }
        set
    }
}

impl<T: Into<Arc<ManagedObject>>> Extend<T> for ObjectSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for object in iter {
            self.insert(object);
        }
    }
}

impl IntoIterator for ObjectSet {
    type Item = Arc<ManagedObject>;
    type IntoIter = hash_map::IntoValues<ObjectId, Arc<ManagedObject>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_values()
    }
}

impl<'a> IntoIterator for &'a ObjectSet {
    type Item = &'a Arc<ManagedObject>;
    type IntoIter = hash_map::Values<'a, ObjectId, Arc<ManagedObject>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u64, age: i32) -> ManagedObject {
        ManagedObject::new("User", ObjectId::from_u64(n)).with_field("age", age)
    }

    #[test]
    fn test_with_field_replaces() {
        let obj = user(1, 30).with_field("age", 31);
        assert_eq!(obj.fields.len(), 1);
        assert_eq!(obj.get("age"), Some(&Value::Int32(31)));
        assert_eq!(obj.get("name"), None);
    }

    #[test]
    fn test_set_is_distinct_by_id() {
        let mut set = ObjectSet::new();
        assert!(set.insert(user(1, 30)));
        assert!(!set.insert(user(1, 99)));
        assert!(set.insert(user(2, 40)));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get(&ObjectId::from_u64(1)).unwrap().get("age"),
            Some(&Value::Int32(30))
        );
    }

    #[test]
    fn test_ids_sorted() {
        let set: ObjectSet = vec![user(3, 1), user(1, 1), user(2, 1)].into_iter().collect();
        assert_eq!(
            set.ids(),
            vec![
                ObjectId::from_u64(1),
                ObjectId::from_u64(2),
                ObjectId::from_u64(3)
            ]
        );
    }

    #[test]
    fn test_filter_shares_objects() {
        let set: ObjectSet = vec![user(1, 17), user(2, 25), user(3, 40)].into_iter().collect();
        let adults = set.filter(&Predicate::from_fn(|o| {
            o.get("age").and_then(|v| v.as_i64()).is_some_and(|a| a >= 18)
        }));

        assert_eq!(adults.ids(), vec![ObjectId::from_u64(2), ObjectId::from_u64(3)]);
        let id = ObjectId::from_u64(2);
        assert!(Arc::ptr_eq(adults.get(&id).unwrap(), set.get(&id).unwrap()));
    }

    #[test]
    fn test_filter_empty() {
        let set = ObjectSet::new();
        assert!(set.filter(&Predicate::always()).is_empty());
    }
}
