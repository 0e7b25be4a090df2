//! # Validity Codes
//!
//! Typed outcomes for user-recoverable transaction checks. A non-`Ok` code
//! fails the enclosing transfer batch but leaves node state untouched; it is
//! never an internal error.

use serde::{Deserialize, Serialize};

/// Outcome of validating one balance change (or one collaborator call).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidityCode {
    Ok,
    /// Debit would take an hbar balance below zero.
    InsufficientAccountBalance,
    /// The payer cannot cover a fee charged during the transfer.
    InsufficientPayerBalance,
    /// Target account is flagged deleted.
    AccountDeleted,
    /// Target account does not exist and carries no alias to create it from.
    InvalidAccountId,
    /// Approval-flagged debit exceeds the spender's remaining allowance.
    AmountExceedsAllowance,
    /// Approval-flagged change references no allowance entry at all.
    SpenderHasNoAllowance,
    /// Debit would take a token-relationship balance below zero.
    InsufficientTokenBalance,
    /// No relationship exists between the account and the token.
    TokenNotAssociated,
    /// Alias bytes cannot be resolved or materialized into an account.
    InvalidAlias,
    /// The referenced NFT does not exist.
    InvalidNftId,
    /// NFT transfer from an account that does not own the serial.
    SenderDoesNotOwnNft,
    /// Auto-creation would exceed the configured entity cap.
    MaxEntitiesExceeded,
    /// Catch-all for a collaborator rejecting the change for its own reasons.
    FailInvalid,
}

impl ValidityCode {
    pub fn is_ok(self) -> bool {
        self == ValidityCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ok_is_ok() {
        assert!(ValidityCode::Ok.is_ok());
        assert!(!ValidityCode::InsufficientAccountBalance.is_ok());
        assert!(!ValidityCode::FailInvalid.is_ok());
    }
}
