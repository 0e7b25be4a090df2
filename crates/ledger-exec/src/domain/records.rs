//! Synthetic records pushed to the records collaborator after commit.

use ledger_types::EntityNum;
use serde::Serialize;

/// One NFT changing hands. `from` or `to` of 0 marks a mint or burn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NftExchange {
    pub token: EntityNum,
    pub serial: u64,
    pub from: EntityNum,
    pub to: EntityNum,
}

/// Net effects of one committed transfer batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransferListRecord {
    /// Net hbar delta per account, ordered by account number.
    pub hbar_adjustments: Vec<(EntityNum, i64)>,
    /// Net fungible unit delta per (token, account), ordered by key.
    pub token_adjustments: Vec<(EntityNum, EntityNum, i64)>,
    pub nft_exchanges: Vec<NftExchange>,
    /// Total auto-creation fees credited to the funding account.
    pub auto_creation_fee: i64,
}

/// One account materialized from an alias.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AutoCreationRecord {
    pub account: EntityNum,
    pub alias: Vec<u8>,
    pub fee: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeStake {
    pub node_id: u64,
    /// Effective stake after min/max clamping.
    pub stake: i64,
    /// Portion of reward-eligible stake counted for the new period.
    pub stake_rewarded: i64,
}

/// End-of-period recomputation summary, one per staking period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeStakeUpdateRecord {
    pub epoch_day: i64,
    pub stakes: Vec<NodeStake>,
}
