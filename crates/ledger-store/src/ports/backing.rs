//! Backing keyed-store abstraction.
//!
//! The persistent engine behind each transactional store (in production a
//! Merkle/virtual-map node) is opaque to this core; the store only needs
//! point reads and writes. Durability mechanics live behind this trait.

/// Keyed entity storage the transactional overlay commits into.
///
/// No `Send + Sync` bound: all mutation happens on the single deterministic
/// transaction-handling thread.
pub trait BackingStore<K, E> {
    fn get(&self, id: &K) -> Option<&E>;
    fn put(&mut self, id: K, entity: E);
    fn remove(&mut self, id: &K);

    fn contains(&self, id: &K) -> bool {
        self.get(id).is_some()
    }
}
