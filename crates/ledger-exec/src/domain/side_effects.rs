//! # SideEffectsTracker
//!
//! Accumulates the externally visible net effects of one transfer batch:
//! net hbar deltas, fungible unit deltas, NFT exchanges, and auto-creation
//! fees. Reset at the start of each batch and drained into a record after a
//! successful commit. Deterministically ordered maps keep replayed nodes
//! byte-identical.

use crate::domain::records::{NftExchange, TransferListRecord};
use ledger_types::EntityNum;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct SideEffectsTracker {
    hbar_deltas: BTreeMap<EntityNum, i64>,
    token_deltas: BTreeMap<(EntityNum, EntityNum), i64>,
    nft_exchanges: Vec<NftExchange>,
    auto_creation_fee: i64,
}

impl SideEffectsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.hbar_deltas.clear();
        self.token_deltas.clear();
        self.nft_exchanges.clear();
        self.auto_creation_fee = 0;
    }

    /// Fold an hbar delta into the running net for `account`. Entries that
    /// net to zero disappear from the record.
    pub fn track_hbar_change(&mut self, account: EntityNum, delta: i64) {
        let net = self.hbar_deltas.entry(account).or_insert(0);
        *net += delta;
        if *net == 0 {
            self.hbar_deltas.remove(&account);
        }
    }

    pub fn track_token_change(&mut self, token: EntityNum, account: EntityNum, delta: i64) {
        let net = self.token_deltas.entry((token, account)).or_insert(0);
        *net += delta;
        if *net == 0 {
            self.token_deltas.remove(&(token, account));
        }
    }

    pub fn track_nft_exchange(&mut self, exchange: NftExchange) {
        self.nft_exchanges.push(exchange);
    }

    pub fn track_auto_creation_fee(&mut self, fee: i64) {
        self.auto_creation_fee += fee;
    }

    /// Sum of all tracked hbar deltas; zero for every accepted batch.
    pub fn net_hbar_sum(&self) -> i64 {
        self.hbar_deltas.values().sum()
    }

    /// Drain the accumulated effects into a record for the historian.
    pub fn take_record(&mut self) -> TransferListRecord {
        let record = TransferListRecord {
            hbar_adjustments: self.hbar_deltas.iter().map(|(&k, &v)| (k, v)).collect(),
            token_adjustments: self
                .token_deltas
                .iter()
                .map(|(&(t, a), &v)| (t, a, v))
                .collect(),
            nft_exchanges: std::mem::take(&mut self.nft_exchanges),
            auto_creation_fee: self.auto_creation_fee,
        };
        self.reset();
        record
    }
}
