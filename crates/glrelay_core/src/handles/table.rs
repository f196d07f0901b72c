//! # Handle Table
//!
//! Maps object identifiers to native handles.

use std::collections::HashMap;

use super::{NativeHandle, ObjectId};

/// Identifier → native handle mapping.
///
/// # Thread Safety
///
/// Owned by the consumer side and only reached through `&mut` access from
/// executing units of work. No lock: the queue lock already orders every
/// write before every later read.
///
/// # Example
///
/// ```rust
/// use glrelay_core::{HandleTable, NativeHandle, ObjectId};
///
/// let mut table = HandleTable::new();
/// let id = ObjectId::from_raw(1);
///
/// assert!(table.lookup(id).is_null());
/// table.insert(id, NativeHandle::new(9));
/// assert_eq!(table.lookup(id), NativeHandle::new(9));
/// ```
#[derive(Debug, Default)]
pub struct HandleTable {
    objects: HashMap<ObjectId, NativeHandle>,
    double_populations: u64,
}

impl HandleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `id` to `handle` if `id` is not already present.
    ///
    /// Returns false and keeps the existing mapping on a second population of
    /// the same identifier.
    pub fn insert(&mut self, id: ObjectId, handle: NativeHandle) -> bool {
        if let Some(existing) = self.objects.get(&id) {
            tracing::warn!(%id, existing = existing.raw(), rejected = handle.raw(), "identifier populated twice");
            self.double_populations += 1;
            return false;
        }
        self.objects.insert(id, handle);
        true
    }

    /// Returns the mapped handle, or [`NativeHandle::NULL`] if absent.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: ObjectId) -> NativeHandle {
        self.objects.get(&id).copied().unwrap_or(NativeHandle::NULL)
    }

    /// Removes the mapping. Removing an absent identifier is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<NativeHandle> {
        self.objects.remove(&id)
    }

    /// True if `id` is currently mapped.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of resident mappings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing is mapped.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of rejected double populations.
    #[inline]
    #[must_use]
    pub fn double_populations(&self) -> u64 {
        self.double_populations
    }

    /// Iterates over resident mappings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, NativeHandle)> + '_ {
        self.objects.iter().map(|(id, handle)| (*id, *handle))
    }

    /// Removes every mapping and returns them.
    pub fn drain(&mut self) -> Vec<(ObjectId, NativeHandle)> {
        self.objects.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_is_null() {
        let table = HandleTable::new();
        assert_eq!(table.lookup(ObjectId::from_raw(5)), NativeHandle::NULL);
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = HandleTable::new();
        let id = ObjectId::from_raw(3);

        assert!(table.insert(id, NativeHandle::new(30)));
        assert!(table.contains(id));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove(id), Some(NativeHandle::new(30)));
        assert!(table.lookup(id).is_null());
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut table = HandleTable::new();
        assert_eq!(table.remove(ObjectId::from_raw(99)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_double_population_keeps_first() {
        let mut table = HandleTable::new();
        let id = ObjectId::from_raw(1);

        assert!(table.insert(id, NativeHandle::new(10)));
        assert!(!table.insert(id, NativeHandle::new(20)));

        assert_eq!(table.lookup(id), NativeHandle::new(10));
        assert_eq!(table.double_populations(), 1);
    }

    #[test]
    fn test_drain_empties_table() {
        let mut table = HandleTable::new();
        table.insert(ObjectId::from_raw(1), NativeHandle::new(1));
        table.insert(ObjectId::from_raw(2), NativeHandle::new(2));

        let mut drained = table.drain();
        drained.sort_by_key(|(id, _)| *id);

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, ObjectId::from_raw(1));
        assert!(table.is_empty());
    }
}
