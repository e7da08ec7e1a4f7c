//! Dense-id arena for stored records.

use std::collections::BTreeMap;

use evently_core::Entity;

/// Records keyed by their id, with ids minted from a counter starting at 1.
///
/// Iteration order is ascending id, which makes listings deterministic
/// without a separate sort where insertion order is the wanted order.
#[derive(Debug)]
pub struct Arena<T: Entity> {
    next: u64,
    items: BTreeMap<T::Id, T>,
}

impl<T: Entity> Arena<T> {
    pub fn new() -> Self {
        Self {
            next: 1,
            items: BTreeMap::new(),
        }
    }

    /// Mint the next id and insert the record the closure builds for it.
    pub fn insert_with(&mut self, build: impl FnOnce(T::Id) -> T) -> &T {
        let id = T::Id::from(self.next);
        self.next += 1;
        self.items.entry(id).or_insert_with(|| build(id))
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        let mut keep = keep;
        self.items.retain(|_, record| keep(record));
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity + Clone> Arena<T> {
    /// Clone-out snapshot in id order.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }
}
