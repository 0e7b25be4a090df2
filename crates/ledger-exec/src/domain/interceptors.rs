//! # Account and NFT Commit Interceptors
//!
//! - [`ZeroSumInterceptor`]: defense-in-depth over the account store.
//!   TransferLogic is expected to always produce a zero-sum batch; this
//!   interceptor catches any code path that would otherwise silently mint
//!   or burn value, and extracts net hbar deltas for the records
//!   collaborator while it scans.
//! - [`NftOwnershipInterceptor`]: extracts (token, serial, from, to)
//!   exchanges from the NFT store's batch and applies pending burns itself,
//!   reporting completed removals so the store skips them.

use crate::domain::records::NftExchange;
use crate::domain::SideEffectsTracker;
use ledger_store::{BackingStore, ChangeSet, CommitInterceptor, PendingChange};
use ledger_types::{Account, EntityNum, LedgerError, Nft, NftId};
use std::cell::RefCell;
use std::rc::Rc;

pub struct ZeroSumInterceptor {
    side_effects: Rc<RefCell<SideEffectsTracker>>,
}

impl ZeroSumInterceptor {
    pub fn new(side_effects: Rc<RefCell<SideEffectsTracker>>) -> Self {
        Self { side_effects }
    }
}

impl CommitInterceptor<EntityNum, Account> for ZeroSumInterceptor {
    fn preview(
        &mut self,
        changes: &mut ChangeSet<EntityNum, Account>,
        backing: &mut dyn BackingStore<EntityNum, Account>,
    ) -> Result<(), LedgerError> {
        let mut net: i64 = 0;
        let mut tracker = self.side_effects.borrow_mut();
        for (id, change) in changes.iter() {
            // Only buffered balances participate; token/NFT consistency is
            // the token-validity collaborator's responsibility.
            let delta = match change {
                PendingChange::Created(account) => account.balance,
                PendingChange::Updated(account) => {
                    account.balance - backing.get(id).map(|a| a.balance).unwrap_or(0)
                }
                PendingChange::Removed => continue,
            };
            if delta != 0 {
                tracker.track_hbar_change(*id, delta);
                net += delta;
            }
        }
        if net != 0 {
            return Err(LedgerError::InternalConsistency(format!(
                "non-zero-sum account commit: net hbar delta {net}"
            )));
        }
        Ok(())
    }
}

pub struct NftOwnershipInterceptor {
    side_effects: Rc<RefCell<SideEffectsTracker>>,
}

impl NftOwnershipInterceptor {
    pub fn new(side_effects: Rc<RefCell<SideEffectsTracker>>) -> Self {
        Self { side_effects }
    }
}

impl CommitInterceptor<NftId, Nft> for NftOwnershipInterceptor {
    fn preview(
        &mut self,
        changes: &mut ChangeSet<NftId, Nft>,
        backing: &mut dyn BackingStore<NftId, Nft>,
    ) -> Result<(), LedgerError> {
        let mut tracker = self.side_effects.borrow_mut();
        for (id, change) in changes.iter() {
            let previous_owner = backing.get(id).map(|nft| nft.owner).unwrap_or(0);
            match change {
                PendingChange::Created(nft) | PendingChange::Updated(nft) => {
                    if nft.owner != previous_owner {
                        tracker.track_nft_exchange(NftExchange {
                            token: id.token_num,
                            serial: id.serial,
                            from: previous_owner,
                            to: nft.owner,
                        });
                    }
                }
                PendingChange::Removed => {
                    tracker.track_nft_exchange(NftExchange {
                        token: id.token_num,
                        serial: id.serial,
                        from: previous_owner,
                        to: 0,
                    });
                    backing.remove(id);
                }
            }
        }
        Ok(())
    }

    /// Burns were applied above; the store must not remove them again.
    fn completes_pending_removals(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_store::adapters::InMemoryStore;

    fn backing_with(entries: &[(EntityNum, i64)]) -> InMemoryStore<EntityNum, Account> {
        let mut backing = InMemoryStore::new();
        for &(id, balance) in entries {
            backing.put_direct(id, Account::with_balance(balance));
        }
        backing
    }

    #[test]
    fn test_balanced_batch_passes_and_tracks_deltas() {
        let tracker = Rc::new(RefCell::new(SideEffectsTracker::new()));
        let mut interceptor = ZeroSumInterceptor::new(Rc::clone(&tracker));
        let mut backing = backing_with(&[(1, 500), (2, 100)]);

        let mut changes = ChangeSet::new();
        changes.record_update(1, Account::with_balance(400));
        changes.record_update(2, Account::with_balance(200));
        interceptor.preview(&mut changes, &mut backing).unwrap();

        let record = tracker.borrow_mut().take_record();
        assert_eq!(record.hbar_adjustments, vec![(1, -100), (2, 100)]);
    }

    #[test]
    fn test_created_account_counts_full_balance() {
        let tracker = Rc::new(RefCell::new(SideEffectsTracker::new()));
        let mut interceptor = ZeroSumInterceptor::new(Rc::clone(&tracker));
        let mut backing = backing_with(&[(1, 500)]);

        let mut changes = ChangeSet::new();
        changes.record_update(1, Account::with_balance(200));
        changes.record_create(9, Account::with_balance(300));
        interceptor.preview(&mut changes, &mut backing).unwrap();
        assert_eq!(tracker.borrow().net_hbar_sum(), 0);
    }

    #[test]
    fn test_unbalanced_batch_is_fatal() {
        let tracker = Rc::new(RefCell::new(SideEffectsTracker::new()));
        let mut interceptor = ZeroSumInterceptor::new(tracker);
        let mut backing = backing_with(&[(1, 500)]);

        let mut changes = ChangeSet::new();
        changes.record_update(1, Account::with_balance(501));
        let err = interceptor.preview(&mut changes, &mut backing).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_balance_changes_are_ignored() {
        let tracker = Rc::new(RefCell::new(SideEffectsTracker::new()));
        let mut interceptor = ZeroSumInterceptor::new(Rc::clone(&tracker));
        let mut backing = backing_with(&[(1, 500)]);

        let mut account = Account::with_balance(500);
        account.decline_reward = true;
        let mut changes = ChangeSet::new();
        changes.record_update(1, account);
        interceptor.preview(&mut changes, &mut backing).unwrap();
        assert!(tracker.borrow_mut().take_record().hbar_adjustments.is_empty());
    }

    #[test]
    fn test_nft_interceptor_records_exchange_and_burn() {
        let tracker = Rc::new(RefCell::new(SideEffectsTracker::new()));
        let mut interceptor = NftOwnershipInterceptor::new(Rc::clone(&tracker));

        let mut backing: InMemoryStore<NftId, Nft> = InMemoryStore::new();
        let transferred = NftId::new(7, 1);
        let burned = NftId::new(7, 2);
        backing.put_direct(transferred, Nft::owned_by(10));
        backing.put_direct(burned, Nft::owned_by(10));

        let mut changes = ChangeSet::new();
        changes.record_update(transferred, Nft::owned_by(20));
        changes.record_remove(burned);
        interceptor.preview(&mut changes, &mut backing).unwrap();

        assert!(interceptor.completes_pending_removals());
        assert!(backing.get(&burned).is_none(), "burn applied by interceptor");
        let record = tracker.borrow_mut().take_record();
        assert_eq!(
            record.nft_exchanges,
            vec![
                NftExchange { token: 7, serial: 1, from: 10, to: 20 },
                NftExchange { token: 7, serial: 2, from: 10, to: 0 },
            ]
        );
    }
}
