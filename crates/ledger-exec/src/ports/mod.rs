//! # Collaborator Ports
//!
//! Narrow contracts through which the execution layer calls its external
//! collaborators. Everything behind these traits is out of scope for this
//! core: token-level validity rules, fee schedules, entity-id allocation,
//! and record persistence.

use crate::domain::{
    AccountsStore, AutoCreationRecord, BalanceChange, NftStore, NodeStakeUpdateRecord,
    TokenRelStore, TransferListRecord,
};
use ledger_types::ValidityCode;

/// Validates and records a fungible/NFT balance change against token-level
/// state (pause, KYC, supply). Applies accepted changes into the open
/// relationship/NFT transactions; everything it writes is covered by the
/// batch's commit-or-rollback.
pub trait TokenValidity {
    fn try_token_change(
        &mut self,
        change: &BalanceChange,
        token_rels: &mut TokenRelStore,
        nfts: &mut NftStore,
    ) -> ValidityCode;
}

/// Checks one proposed change against the target account's current scoped
/// state (sufficient balance or allowance, not deleted) without mutating
/// anything.
pub trait ScopedCheck {
    fn validate(&self, change: &BalanceChange, accounts: &AccountsStore) -> ValidityCode;
}

/// Materializes accounts for alias-addressed credits.
pub trait AutoCreation {
    /// On success: creates the account inside the open accounts transaction,
    /// rewrites the change's target to the new id, deducts the creation fee
    /// from the change's aggregated amount, and returns `(Ok, fee)`. On
    /// failure returns the validity code and no fee.
    fn create(&mut self, change: &mut BalanceChange, accounts: &mut AccountsStore)
        -> (ValidityCode, i64);

    /// Undo provisional alias bindings after a failed batch. Returns whether
    /// anything was reclaimed.
    fn reclaim_pending_aliases(&mut self) -> bool;

    /// Hand buffered child records to the historian after a successful
    /// commit.
    fn submit_records(&mut self, historian: &mut dyn RecordsHistorian);
}

/// Receives net side effects and synthetic records for external
/// persistence. Push-only; this core never reads them back.
pub trait RecordsHistorian {
    fn record_transfer_list(&mut self, record: TransferListRecord);
    fn record_node_stakes(&mut self, record: NodeStakeUpdateRecord);
    fn record_auto_creation(&mut self, record: AutoCreationRecord);
}
