//! # CommitInterceptor contract
//!
//! A hook invoked once per store at commit time with the full pending
//! [`ChangeSet`], so cross-entity invariants (zero-sum among them) are
//! checked once per batch rather than per change.

use crate::domain::ChangeSet;
use crate::ports::BackingStore;
use ledger_types::LedgerError;

/// Validation and side-effect extraction over a full pending batch.
///
/// An error from `preview` vetoes the commit: the owning store discards the
/// ChangeSet and returns the error to the caller unchanged, with nothing
/// applied. By the time changes reach commit they have already passed
/// transaction-level validation, so a preview failure is an
/// internal-consistency bug, never a recoverable validity code.
pub trait CommitInterceptor<K, E> {
    /// Inspect (and possibly complete) the pending batch.
    ///
    /// The ChangeSet is mutable so an interceptor can apply ancillary
    /// completions, e.g. fold a computed reward into a pending balance. The
    /// backing store is mutable only for interceptors that report
    /// [`completes_pending_removals`](Self::completes_pending_removals).
    fn preview(
        &mut self,
        changes: &mut ChangeSet<K, E>,
        backing: &mut dyn BackingStore<K, E>,
    ) -> Result<(), LedgerError>;

    /// When true, the owning store skips its own removal application for
    /// `Removed` entries: this interceptor already performed them while
    /// computing its side effects.
    fn completes_pending_removals(&self) -> bool {
        false
    }
}
