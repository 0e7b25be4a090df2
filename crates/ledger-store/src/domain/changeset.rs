//! # ChangeSet
//!
//! Insertion-ordered buffer of pending per-entity mutations.
//!
//! ## Coalescing Rules
//!
//! One entity holds at most one pending change; later operations fold into
//! the earlier one:
//!
//! - update after create stays a create (with the newer value)
//! - remove after create drops the entry entirely, since the entity was
//!   never visible outside the transaction
//! - remove after update becomes a remove
//! - update after remove is a usage violation and panics

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// One buffered mutation. A buffered update or create carries the whole
/// mutated entity value; commit and interceptors diff it against the
/// backing store where a field-level view is needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingChange<E> {
    Created(E),
    Updated(E),
    Removed,
}

/// Ordered buffer of pending mutations for one store.
#[derive(Clone, Debug)]
pub struct ChangeSet<K, E> {
    /// Insertion order of first touch; ids whose entries coalesced away are
    /// skipped at iteration time.
    order: Vec<K>,
    entries: HashMap<K, PendingChange<E>>,
}

impl<K, E> Default for ChangeSet<K, E> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K, E> ChangeSet<K, E>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Buffer an entity creation.
    pub fn record_create(&mut self, id: K, entity: E) {
        self.track_order(id);
        self.entries.insert(id, PendingChange::Created(entity));
    }

    /// Buffer an entity update, folding into an earlier pending change.
    pub fn record_update(&mut self, id: K, entity: E) {
        let next = match self.entries.get(&id) {
            Some(PendingChange::Created(_)) => PendingChange::Created(entity),
            Some(PendingChange::Removed) => {
                panic!("update of {id:?} after its pending removal")
            }
            _ => PendingChange::Updated(entity),
        };
        self.track_order(id);
        self.entries.insert(id, next);
    }

    /// Buffer an entity removal, folding into an earlier pending change.
    pub fn record_remove(&mut self, id: K) {
        match self.entries.get(&id) {
            Some(PendingChange::Created(_)) => {
                self.entries.remove(&id);
            }
            _ => {
                self.track_order(id);
                self.entries.insert(id, PendingChange::Removed);
            }
        }
    }

    pub fn get(&self, id: &K) -> Option<&PendingChange<E>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &K) -> Option<&mut PendingChange<E>> {
        self.entries.get_mut(id)
    }

    /// Pending changes in insertion order of first touch.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &PendingChange<E>)> {
        self.order.iter().filter_map(|id| {
            self.entries.get(id).map(|change| (id, change))
        })
    }

    /// Ids with a live pending change, in insertion order.
    pub fn touched_ids(&self) -> Vec<K> {
        self.iter().map(|(id, _)| *id).collect()
    }

    /// Drain entries in insertion order for application to a backing store.
    pub fn drain(self) -> impl Iterator<Item = (K, PendingChange<E>)> {
        let mut entries = self.entries;
        self.order
            .into_iter()
            .filter_map(move |id| entries.remove(&id).map(|change| (id, change)))
    }

    fn track_order(&mut self, id: K) {
        // Batches are small; a linear scan beats maintaining a second index.
        if !self.entries.contains_key(&id) && !self.order.contains(&id) {
            self.order.push(id);
        }
    }
}
