//! Sequential-id auto-creation with a flat fee.

use crate::domain::{AccountsStore, AutoCreationRecord, BalanceChange};
use crate::ports::{AutoCreation, RecordsHistorian};
use ledger_types::{EntityNum, ValidityCode};

/// Materializes alias-addressed accounts from a monotonically increasing id
/// counter and charges a flat creation fee out of the credited amount.
/// Records buffer until the batch commits; a failed batch reclaims the
/// provisionally assigned ids.
pub struct SequentialAutoCreation {
    next_id: EntityNum,
    creation_fee: i64,
    pending: Vec<AutoCreationRecord>,
}

impl SequentialAutoCreation {
    pub fn new(first_id: EntityNum, creation_fee: i64) -> Self {
        Self {
            next_id: first_id,
            creation_fee,
            pending: Vec::new(),
        }
    }

    pub fn next_id(&self) -> EntityNum {
        self.next_id
    }
}

impl AutoCreation for SequentialAutoCreation {
    fn create(
        &mut self,
        change: &mut BalanceChange,
        accounts: &mut AccountsStore,
    ) -> (ValidityCode, i64) {
        let Some(alias) = change.alias.clone() else {
            return (ValidityCode::InvalidAlias, 0);
        };
        if alias.is_empty() {
            return (ValidityCode::InvalidAlias, 0);
        }
        // The credited amount must survive the fee with a positive balance.
        if change.amount <= self.creation_fee {
            return (ValidityCode::InsufficientAccountBalance, 0);
        }

        let id = self.next_id;
        self.next_id += 1;
        accounts.create(id);
        change.resolve_alias_to(id);
        change.deduct_fee(self.creation_fee);

        tracing::info!(
            "[ledger] auto-created account {id} for alias {}",
            hex::encode(&alias)
        );
        self.pending.push(AutoCreationRecord {
            account: id,
            alias,
            fee: self.creation_fee,
        });
        (ValidityCode::Ok, self.creation_fee)
    }

    fn reclaim_pending_aliases(&mut self) -> bool {
        let reclaimed = self.pending.len() as u64;
        if reclaimed == 0 {
            return false;
        }
        self.next_id -= reclaimed;
        self.pending.clear();
        tracing::debug!("[ledger] reclaimed {reclaimed} provisional account ids");
        true
    }

    fn submit_records(&mut self, historian: &mut dyn RecordsHistorian) {
        for record in self.pending.drain(..) {
            historian.record_auto_creation(record);
        }
    }
}
