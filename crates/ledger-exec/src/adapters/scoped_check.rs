//! Account-scoped validation of proposed balance changes.

use crate::domain::{AccountsStore, BalanceChange, Units};
use crate::ports::ScopedCheck;
use ledger_types::{EntityNumPair, ValidityCode};

/// Validates a change against the target account's visible state: the
/// account exists and is live, a debit is covered by balance, and an
/// approval-flagged change is covered by the allowance `account` granted to
/// the change's payer. Reads through any open transaction; never mutates.
pub struct AccountScopedCheck;

impl ScopedCheck for AccountScopedCheck {
    fn validate(&self, change: &BalanceChange, accounts: &AccountsStore) -> ValidityCode {
        let Some(account) = accounts.get(&change.account) else {
            return ValidityCode::InvalidAccountId;
        };
        if account.deleted {
            return ValidityCode::AccountDeleted;
        }
        match change.units {
            Units::Hbar => {
                if change.is_approval && change.amount < 0 {
                    match account.crypto_allowances.get(&change.payer) {
                        None => return ValidityCode::SpenderHasNoAllowance,
                        Some(&allowed) if allowed < -change.amount => {
                            return ValidityCode::AmountExceedsAllowance;
                        }
                        Some(_) => {}
                    }
                }
                if account.balance + change.amount < 0 {
                    return ValidityCode::InsufficientAccountBalance;
                }
            }
            Units::Fungible { token } => {
                if change.is_approval && change.amount < 0 {
                    let key = EntityNumPair::token_spender(token, change.payer);
                    match account.fungible_allowances.get(&key) {
                        None => return ValidityCode::SpenderHasNoAllowance,
                        Some(&allowed) if allowed < -change.amount => {
                            return ValidityCode::AmountExceedsAllowance;
                        }
                        Some(_) => {}
                    }
                }
            }
            Units::Nft { token, serial } => {
                // The receiver appears only as the counterparty, so this is
                // its one existence check in the batch.
                if let Some(receiver) = change.counterparty {
                    match accounts.get(&receiver) {
                        None => return ValidityCode::InvalidAccountId,
                        Some(account) if account.deleted => return ValidityCode::AccountDeleted,
                        Some(_) => {}
                    }
                }
                if change.is_approval {
                    let key = EntityNumPair::token_spender(token, change.payer);
                    match account.nft_allowances.get(&key) {
                        None => return ValidityCode::SpenderHasNoAllowance,
                        Some(allowance)
                            if !allowance.approved_for_all
                                && !allowance.serials.contains(&serial) =>
                        {
                            return ValidityCode::SpenderHasNoAllowance;
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        ValidityCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_store::adapters::InMemoryStore;
    use ledger_store::TransactionalStore;
    use ledger_types::{Account, NftAllowance};

    fn accounts_with(entries: Vec<(u64, Account)>) -> AccountsStore {
        let mut backing = InMemoryStore::new();
        for (id, account) in entries {
            backing.put_direct(id, account);
        }
        TransactionalStore::new("accounts", Box::new(backing))
    }

    #[test]
    fn test_missing_and_deleted_accounts_rejected() {
        let mut deleted = Account::with_balance(100);
        deleted.deleted = true;
        let accounts = accounts_with(vec![(2, deleted)]);
        let check = AccountScopedCheck;

        assert_eq!(
            check.validate(&BalanceChange::hbar(1, -10), &accounts),
            ValidityCode::InvalidAccountId
        );
        assert_eq!(
            check.validate(&BalanceChange::hbar(2, -10), &accounts),
            ValidityCode::AccountDeleted
        );
    }

    #[test]
    fn test_overdraft_rejected_exact_balance_allowed() {
        let accounts = accounts_with(vec![(1, Account::with_balance(100))]);
        let check = AccountScopedCheck;

        assert_eq!(
            check.validate(&BalanceChange::hbar(1, -100), &accounts),
            ValidityCode::Ok
        );
        assert_eq!(
            check.validate(&BalanceChange::hbar(1, -101), &accounts),
            ValidityCode::InsufficientAccountBalance
        );
    }

    #[test]
    fn test_hbar_approval_requires_covering_allowance() {
        let mut owner = Account::with_balance(1_000);
        owner.adjust_crypto_allowance(77, 50).unwrap();
        let accounts = accounts_with(vec![(1, owner)]);
        let check = AccountScopedCheck;

        assert_eq!(
            check.validate(&BalanceChange::hbar_approved(1, -50, 77), &accounts),
            ValidityCode::Ok
        );
        assert_eq!(
            check.validate(&BalanceChange::hbar_approved(1, -51, 77), &accounts),
            ValidityCode::AmountExceedsAllowance
        );
        assert_eq!(
            check.validate(&BalanceChange::hbar_approved(1, -10, 88), &accounts),
            ValidityCode::SpenderHasNoAllowance
        );
    }

    #[test]
    fn test_nft_transfer_requires_live_receiver() {
        let mut deleted = Account::with_balance(0);
        deleted.deleted = true;
        let accounts = accounts_with(vec![
            (1, Account::with_balance(0)),
            (3, deleted),
        ]);
        let check = AccountScopedCheck;

        assert_eq!(
            check.validate(&BalanceChange::nft(7, 1, 1, 2), &accounts),
            ValidityCode::InvalidAccountId
        );
        assert_eq!(
            check.validate(&BalanceChange::nft(7, 1, 1, 3), &accounts),
            ValidityCode::AccountDeleted
        );
    }

    #[test]
    fn test_nft_approval_checks_serial_or_blanket() {
        let mut owner = Account::with_balance(0);
        let key = EntityNumPair::token_spender(7, 77);
        owner
            .nft_allowances
            .insert(key, NftAllowance::for_serials([3]));
        let blanket_key = EntityNumPair::token_spender(8, 77);
        owner
            .nft_allowances
            .insert(blanket_key, NftAllowance::approved_for_all());
        let accounts = accounts_with(vec![(1, owner), (2, Account::with_balance(0))]);
        let check = AccountScopedCheck;

        assert_eq!(
            check.validate(&BalanceChange::nft_approved(7, 3, 1, 2, 77), &accounts),
            ValidityCode::Ok
        );
        assert_eq!(
            check.validate(&BalanceChange::nft_approved(7, 4, 1, 2, 77), &accounts),
            ValidityCode::SpenderHasNoAllowance
        );
        assert_eq!(
            check.validate(&BalanceChange::nft_approved(8, 999, 1, 2, 77), &accounts),
            ValidityCode::Ok
        );
    }
}
