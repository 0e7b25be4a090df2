//! # Error Taxonomy
//!
//! Two kinds of failure flow out of the accounting core and they must never
//! be conflated:
//!
//! - [`LedgerError::Validity`]: a user transaction failed a check. The
//!   batch rolls back, the transaction is recorded as failed, the node is
//!   healthy.
//! - Everything else: an internal-consistency violation. A transaction
//!   that should never have reached commit did, or persisted state is
//!   undecodable. These propagate uncaught so the node can flag itself as
//!   diverged instead of continuing with corrupted invariants.
//!
//! Usage-contract violations (double `begin`, `commit` without `begin`) are
//! programming errors and panic at the call site rather than appearing here.

use crate::validity::ValidityCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// User-recoverable transaction failure; the batch rolled back cleanly.
    #[error("transaction failed: {0:?}")]
    Validity(ValidityCode),

    /// An invariant this core guarantees was found broken at commit time.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    /// Persisted composite key written by an incompatible codec version.
    #[error("unsupported composite key version {found}, expected {expected}")]
    UnsupportedKeyVersion { found: u8, expected: u8 },
}

impl LedgerError {
    /// True for errors that must propagate to the node level uncaught.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LedgerError::Validity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_is_recoverable() {
        let err = LedgerError::Validity(ValidityCode::InsufficientAccountBalance);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_consistency_and_codec_errors_are_fatal() {
        assert!(LedgerError::InternalConsistency("x".into()).is_fatal());
        assert!(LedgerError::UnsupportedKeyVersion { found: 9, expected: 1 }.is_fatal());
    }
}
