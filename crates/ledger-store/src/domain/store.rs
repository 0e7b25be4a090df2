//! # TransactionalStore
//!
//! Wraps a backing keyed store with begin/commit/rollback semantics over a
//! [`ChangeSet`]. Reads go through the pending overlay; writes buffer until
//! commit; nothing is visible to outside readers before commit.
//!
//! ## Usage Contract
//!
//! Exactly one transaction may be open per store instance. Opening a second,
//! or committing/rolling back/mutating without one, is a programming error
//! and panics eagerly rather than limping on.

use crate::domain::{ChangeSet, CommitInterceptor, PendingChange};
use crate::ports::{BackingStore, EntityChangeObserver};
use ledger_types::LedgerError;
use std::fmt::Debug;
use std::hash::Hash;

pub struct TransactionalStore<K, E> {
    label: &'static str,
    backing: Box<dyn BackingStore<K, E>>,
    /// Statically ordered at construction; runs in this order at commit.
    interceptors: Vec<Box<dyn CommitInterceptor<K, E>>>,
    observer: Option<Box<dyn EntityChangeObserver<K>>>,
    changes: Option<ChangeSet<K, E>>,
}

impl<K, E> TransactionalStore<K, E>
where
    K: Copy + Eq + Hash + Debug,
    E: Clone + Default,
{
    pub fn new(label: &'static str, backing: Box<dyn BackingStore<K, E>>) -> Self {
        Self {
            label,
            backing,
            interceptors: Vec::new(),
            observer: None,
            changes: None,
        }
    }

    /// Append an interceptor to the commit chain. Called during wiring only;
    /// the chain is fixed before the first transaction opens.
    pub fn with_interceptor(mut self, interceptor: Box<dyn CommitInterceptor<K, E>>) -> Self {
        assert!(
            self.changes.is_none(),
            "[{}] interceptor registered mid-transaction",
            self.label
        );
        self.interceptors.push(interceptor);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn EntityChangeObserver<K>>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Open a transaction. Panics if one is already open; nested or
    /// concurrent transactions on one store instance do not exist.
    pub fn begin(&mut self) {
        assert!(
            self.changes.is_none(),
            "[{}] begin() while a transaction is already open",
            self.label
        );
        self.changes = Some(ChangeSet::new());
    }

    pub fn is_in_transaction(&self) -> bool {
        self.changes.is_some()
    }

    /// Read through the pending overlay onto the backing store. A pending
    /// removal reads as absent.
    pub fn get(&self, id: &K) -> Option<&E> {
        if let Some(changes) = &self.changes {
            match changes.get(id) {
                Some(PendingChange::Created(e)) | Some(PendingChange::Updated(e)) => {
                    return Some(e)
                }
                Some(PendingChange::Removed) => return None,
                None => {}
            }
        }
        self.backing.get(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.get(id).is_some()
    }

    /// Owned copy of the scoped view, to be mutated and handed back via
    /// [`put`](Self::put).
    pub fn get_for_mutation(&self, id: &K) -> Option<E> {
        self.get(id).cloned()
    }

    /// Buffer a mutation of an existing (or just-created) entity.
    pub fn put(&mut self, id: K, entity: E) {
        self.open_changes("put").record_update(id, entity);
    }

    /// Buffer creation of `id` with default field values.
    pub fn create(&mut self, id: K) {
        self.create_with(id, E::default());
    }

    /// Buffer creation of `id` with explicit field values. Panics if the id
    /// is already visible through the scoped view.
    pub fn create_with(&mut self, id: K, entity: E) {
        assert!(
            self.get(&id).is_none(),
            "[{}] create() of already-visible entity {id:?}",
            self.label
        );
        self.open_changes("create").record_create(id, entity);
    }

    /// Buffer removal of a visible entity. The backing store is untouched
    /// until commit.
    pub fn remove(&mut self, id: K) {
        assert!(
            self.get(&id).is_some(),
            "[{}] remove() of unknown entity {id:?}",
            self.label
        );
        self.open_changes("remove").record_remove(id);
    }

    /// Run the interceptor chain over the full batch, then apply it.
    ///
    /// If any interceptor errors, the ChangeSet is discarded and the error
    /// returned unchanged; the backing store sees none of the batch.
    pub fn commit(&mut self) -> Result<(), LedgerError> {
        let mut changes = self
            .changes
            .take()
            .unwrap_or_else(|| panic!("[{}] commit() without an open transaction", self.label));

        for interceptor in &mut self.interceptors {
            interceptor.preview(&mut changes, self.backing.as_mut())?;
        }
        let removals_completed = self
            .interceptors
            .iter()
            .any(|i| i.completes_pending_removals());

        let mut touched = Vec::with_capacity(changes.len());
        for (id, change) in changes.drain() {
            match change {
                PendingChange::Created(entity) | PendingChange::Updated(entity) => {
                    self.backing.put(id, entity);
                }
                PendingChange::Removed => {
                    if !removals_completed {
                        self.backing.remove(&id);
                    }
                }
            }
            touched.push(id);
        }

        if let Some(observer) = &mut self.observer {
            observer.entities_changed(&touched);
        }
        tracing::debug!("[ledger] {} committed {} changes", self.label, touched.len());
        Ok(())
    }

    /// Discard the open ChangeSet unconditionally.
    pub fn rollback(&mut self) {
        let discarded = self
            .changes
            .take()
            .unwrap_or_else(|| panic!("[{}] rollback() without an open transaction", self.label));
        tracing::debug!(
            "[ledger] {} rolled back {} pending changes",
            self.label,
            discarded.len()
        );
    }

    /// Direct read of the committed state, bypassing any open overlay.
    pub fn committed(&self, id: &K) -> Option<&E> {
        self.backing.get(id)
    }

    fn open_changes(&mut self, op: &str) -> &mut ChangeSet<K, E> {
        match &mut self.changes {
            Some(changes) => changes,
            None => panic!("[{}] {op}() without an open transaction", self.label),
        }
    }
}
