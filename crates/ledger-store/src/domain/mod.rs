//! Store-layer domain logic.

mod changeset;
mod interceptor;
mod store;

pub use changeset::{ChangeSet, PendingChange};
pub use interceptor::CommitInterceptor;
pub use store::TransactionalStore;
