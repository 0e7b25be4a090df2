//! # TransferLogic
//!
//! Applies an ordered batch of [`BalanceChange`]s across the account, NFT,
//! and token-relationship stores as one all-or-nothing operation.
//!
//! ## Algorithm
//!
//! Two phases make the zero-sum invariant possible to guarantee atomically:
//!
//! 1. **Validate and buffer**, in caller-supplied order, fail-fast. Each
//!    accepted change is applied into the open transactions immediately:
//!    alias-bearing hbar credits through auto-creation, plain hbar changes
//!    through the scoped-check collaborator, fungible/NFT changes through
//!    scoped-check plus the token-validity collaborator. Buffering as part
//!    of validation means every later check reads through the overlay and
//!    sees the earlier debits, so a batch cannot jointly overdraw a
//!    balance or an allowance that each change alone would respect.
//! 2. **Commit**: the accounts store commits first (it carries the
//!    fallible interceptors), then the NFT and relationship stores.
//!
//! Nothing is visible outside the transactions until every change in the
//! batch has passed. Any failure rolls back whatever has not committed and
//! undoes provisional alias bindings; a validity failure leaves the caller
//! one typed code and no state change. TransferLogic is the only component
//! permitted to hold transactions on all three stores at once.

use crate::domain::{
    AccountsStore, BalanceChange, NftStore, SideEffectsTracker, TokenRelStore, Units,
};
use crate::ports::{AutoCreation, RecordsHistorian, ScopedCheck, TokenValidity};
use ledger_types::{EntityNum, LedgerError, ValidityCode};
use std::cell::RefCell;
use std::rc::Rc;

pub struct TransferLogic {
    accounts: AccountsStore,
    token_rels: TokenRelStore,
    nfts: NftStore,
    scoped_check: Box<dyn ScopedCheck>,
    token_validity: Box<dyn TokenValidity>,
    auto_creation: Option<Box<dyn AutoCreation>>,
    historian: Rc<RefCell<dyn RecordsHistorian>>,
    side_effects: Rc<RefCell<SideEffectsTracker>>,
    /// Account credited with auto-creation fees.
    funding_account: EntityNum,
}

/// What one scan over the batch produced.
struct ScanOutcome {
    auto_creation_fee: i64,
    attempted_auto_creation: bool,
    failure: Option<ValidityCode>,
}

impl TransferLogic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        accounts: AccountsStore,
        token_rels: TokenRelStore,
        nfts: NftStore,
        scoped_check: Box<dyn ScopedCheck>,
        token_validity: Box<dyn TokenValidity>,
        auto_creation: Option<Box<dyn AutoCreation>>,
        historian: Rc<RefCell<dyn RecordsHistorian>>,
        side_effects: Rc<RefCell<SideEffectsTracker>>,
        funding_account: EntityNum,
    ) -> Self {
        Self {
            accounts,
            token_rels,
            nfts,
            scoped_check,
            token_validity,
            auto_creation,
            historian,
            side_effects,
            funding_account,
        }
    }

    pub fn accounts(&self) -> &AccountsStore {
        &self.accounts
    }

    pub fn token_rels(&self) -> &TokenRelStore {
        &self.token_rels
    }

    pub fn nfts(&self) -> &NftStore {
        &self.nfts
    }

    /// Execute one transfer batch. On any `Err` no store state changed and
    /// no transaction is left open.
    pub fn do_zero_sum_transfers(
        &mut self,
        changes: &mut [BalanceChange],
    ) -> Result<(), LedgerError> {
        self.accounts.begin();
        self.token_rels.begin();
        self.nfts.begin();
        self.side_effects.borrow_mut().reset();

        let outcome = match self.validate_and_buffer(changes) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.rollback_open(true);
                return Err(err);
            }
        };
        if let Some(code) = outcome.failure {
            self.rollback_open(true);
            tracing::debug!("[ledger] transfer batch rejected: {code:?}");
            return Err(LedgerError::Validity(code));
        }

        if outcome.auto_creation_fee > 0 {
            if let Err(err) = self.credit_funding_account(outcome.auto_creation_fee) {
                self.rollback_open(true);
                return Err(err);
            }
        }

        // Accounts first: its interceptor chain is the one that can veto.
        if let Err(err) = self.accounts.commit() {
            self.rollback_open(true);
            return Err(err);
        }
        if let Err(err) = self.nfts.commit() {
            self.rollback_open(false);
            return Err(err);
        }
        self.token_rels.commit()?;

        if outcome.attempted_auto_creation {
            if let Some(auto_creation) = self.auto_creation.as_mut() {
                auto_creation.submit_records(&mut *self.historian.borrow_mut());
            }
        }
        let record = self.side_effects.borrow_mut().take_record();
        self.historian.borrow_mut().record_transfer_list(record);
        Ok(())
    }

    /// One pass over the batch: validate each change against the overlay
    /// and buffer accepted changes into the open transactions. `Err` is
    /// fatal; a validity rejection comes back in the outcome.
    fn validate_and_buffer(
        &mut self,
        changes: &mut [BalanceChange],
    ) -> Result<ScanOutcome, LedgerError> {
        let mut outcome = ScanOutcome {
            auto_creation_fee: 0,
            attempted_auto_creation: false,
            failure: None,
        };
        for change in changes.iter_mut() {
            let code = if change.is_hbar() && change.alias.is_some() {
                let Some(auto_creation) = self.auto_creation.as_mut() else {
                    return Err(LedgerError::InternalConsistency(
                        "alias-bearing change reached TransferLogic with no auto-creation \
                         collaborator configured"
                            .to_string(),
                    ));
                };
                outcome.attempted_auto_creation = true;
                let (code, fee) = auto_creation.create(change, &mut self.accounts);
                if code.is_ok() {
                    outcome.auto_creation_fee += fee;
                    self.buffer_hbar_change(change)?;
                }
                code
            } else if change.is_hbar() {
                let code = self.scoped_check.validate(change, &self.accounts);
                if code.is_ok() {
                    self.buffer_hbar_change(change)?;
                }
                code
            } else {
                let mut code = self.scoped_check.validate(change, &self.accounts);
                if code.is_ok() {
                    code = self.token_validity.try_token_change(
                        change,
                        &mut self.token_rels,
                        &mut self.nfts,
                    );
                }
                if code.is_ok() {
                    self.buffer_token_side_effects(change)?;
                }
                code
            };
            if !code.is_ok() {
                outcome.failure = Some(code);
                break;
            }
        }
        Ok(outcome)
    }

    /// Buffer a validated hbar change's new balance (and allowance
    /// consumption) so later validations read through it.
    fn buffer_hbar_change(&mut self, change: &BalanceChange) -> Result<(), LedgerError> {
        let mut account = self
            .accounts
            .get_for_mutation(&change.account)
            .ok_or_else(|| missing_after_validation(change.account))?;
        account.balance += change.amount;
        if change.is_approval && change.amount < 0 {
            account.adjust_crypto_allowance(change.payer, change.amount)?;
        }
        self.accounts.put(change.account, account);
        Ok(())
    }

    /// Token/NFT relationship state was already applied by the
    /// token-validity collaborator; settle the account-side effects.
    fn buffer_token_side_effects(&mut self, change: &BalanceChange) -> Result<(), LedgerError> {
        match change.units {
            Units::Fungible { token } => {
                if change.is_approval && change.amount < 0 {
                    let mut owner = self
                        .accounts
                        .get_for_mutation(&change.account)
                        .ok_or_else(|| missing_after_validation(change.account))?;
                    owner.adjust_fungible_allowance(token, change.payer, change.amount)?;
                    self.accounts.put(change.account, owner);
                }
                self.side_effects.borrow_mut().track_token_change(
                    token,
                    change.account,
                    change.amount,
                );
            }
            Units::Nft { token, serial } => {
                if change.is_approval {
                    let mut owner = self
                        .accounts
                        .get_for_mutation(&change.account)
                        .ok_or_else(|| missing_after_validation(change.account))?;
                    owner.consume_nft_allowance(token, change.payer, serial);
                    self.accounts.put(change.account, owner);
                }
            }
            Units::Hbar => {}
        }
        Ok(())
    }

    fn credit_funding_account(&mut self, fee: i64) -> Result<(), LedgerError> {
        let mut funding = self
            .accounts
            .get_for_mutation(&self.funding_account)
            .ok_or_else(|| {
                LedgerError::InternalConsistency(format!(
                    "fee funding account {} does not exist",
                    self.funding_account
                ))
            })?;
        funding.balance += fee;
        self.accounts.put(self.funding_account, funding);
        self.side_effects.borrow_mut().track_auto_creation_fee(fee);
        Ok(())
    }

    /// Discard whatever is still uncommitted, plus provisional alias
    /// bindings and tracked side effects.
    fn rollback_open(&mut self, reclaim_aliases: bool) {
        if self.accounts.is_in_transaction() {
            self.accounts.rollback();
        }
        if self.token_rels.is_in_transaction() {
            self.token_rels.rollback();
        }
        if self.nfts.is_in_transaction() {
            self.nfts.rollback();
        }
        if reclaim_aliases {
            if let Some(auto_creation) = self.auto_creation.as_mut() {
                auto_creation.reclaim_pending_aliases();
            }
        }
        self.side_effects.borrow_mut().reset();
    }
}

fn missing_after_validation(account: EntityNum) -> LedgerError {
    LedgerError::InternalConsistency(format!(
        "validated change targets missing account {account}"
    ))
}
