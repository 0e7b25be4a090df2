//! # ledger-store
//!
//! Generic transactional property store for ledger entities.
//!
//! ## Role in System
//!
//! - Buffers pending entity mutations in a [`ChangeSet`] invisible to
//!   readers outside the active transaction
//! - Commits or discards the whole buffer atomically
//! - Runs a statically ordered chain of [`CommitInterceptor`]s over the full
//!   batch before anything touches the backing store
//!
//! ## Execution Model
//!
//! Single-threaded and deterministic: one logical thread applies
//! consensus-ordered transactions, so no store type carries `Send + Sync`
//! obligations and none of the calls block.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryStore;
pub use domain::{ChangeSet, CommitInterceptor, PendingChange, TransactionalStore};
pub use ports::{BackingStore, EntityChangeObserver};
