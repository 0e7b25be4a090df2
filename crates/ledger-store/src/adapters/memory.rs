//! # In-Memory Backing Store
//!
//! HashMap-backed [`BackingStore`] used for wiring and tests. Production
//! deployments put the persistent Merkle engine behind the same port.

use crate::ports::BackingStore;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore<K, E> {
    entities: HashMap<K, E>,
}

impl<K, E> InMemoryStore<K, E>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }

    /// Seed an entity outside any transaction (test setup, genesis wiring).
    pub fn put_direct(&mut self, id: K, entity: E) {
        self.entities.insert(id, entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Owned copy of the full committed state, for pre/post equality checks.
    pub fn snapshot(&self) -> HashMap<K, E>
    where
        E: Clone,
    {
        self.entities.clone()
    }
}

impl<K, E> BackingStore<K, E> for InMemoryStore<K, E>
where
    K: Copy + Eq + Hash,
{
    fn get(&self, id: &K) -> Option<&E> {
        self.entities.get(id)
    }

    fn put(&mut self, id: K, entity: E) {
        self.entities.insert(id, entity);
    }

    fn remove(&mut self, id: &K) {
        self.entities.remove(id);
    }
}
