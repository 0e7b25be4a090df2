//! # Ledger Entities
//!
//! The fixed-struct entities the transactional stores buffer and commit.
//! Every field is owned by value; allowance maps are owned `BTreeMap`s so a
//! buffered copy of an account can never alias committed state.
//!
//! ## Invariants
//!
//! - `Account::balance` never goes negative (enforced at mutation sites).
//! - A crypto or fungible allowance amount of exactly zero is never stored;
//!   reaching zero removes the entry.
//! - An approved-for-all NFT allowance never stores a serial list.

use crate::errors::LedgerError;
use crate::keys::{EntityNum, EntityNumPair, NftId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Ring capacity for per-node reward-sum history: one leading entry for the
/// just-closed period plus 365 retained days.
pub const REWARD_HISTORY_LEN: usize = 366;

/// Staking target of an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakedId {
    /// Not staked.
    #[default]
    None,
    /// Staked to another account, which proxies to that account's node.
    ToAccount(EntityNum),
    /// Staked directly to a consensus node.
    ToNode(u64),
}

/// NFT allowance granted by an owner to one spender for one collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAllowance {
    /// Spender may move any serial in the collection; `serials` stays empty.
    pub approved_for_all: bool,
    /// Explicitly granted serials, consumed one by one as transfers use them.
    pub serials: BTreeSet<u64>,
}

impl NftAllowance {
    pub fn for_serials<I: IntoIterator<Item = u64>>(serials: I) -> Self {
        Self {
            approved_for_all: false,
            serials: serials.into_iter().collect(),
        }
    }

    pub fn approved_for_all() -> Self {
        Self {
            approved_for_all: true,
            serials: BTreeSet::new(),
        }
    }
}

/// An account as the account store commits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Hbar balance in tinybars. Non-negative.
    pub balance: i64,
    pub deleted: bool,
    pub is_smart_contract: bool,
    pub staked_id: StakedId,
    /// Epoch day staking last became effective, or -1 when unset.
    pub stake_period_start: i64,
    /// Aggregate hbars delegated to this account by others.
    pub staked_to_me: i64,
    pub decline_reward: bool,
    /// Hbar allowances keyed by spender.
    pub crypto_allowances: BTreeMap<EntityNum, i64>,
    /// Fungible-token allowances keyed by (token, spender).
    pub fungible_allowances: BTreeMap<EntityNumPair, i64>,
    /// NFT allowances keyed by (token, spender).
    pub nft_allowances: BTreeMap<EntityNumPair, NftAllowance>,
    /// Count of token relationships, maintained by the association layer.
    pub num_associations: u32,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: 0,
            deleted: false,
            is_smart_contract: false,
            staked_id: StakedId::None,
            stake_period_start: -1,
            staked_to_me: 0,
            decline_reward: false,
            crypto_allowances: BTreeMap::new(),
            fungible_allowances: BTreeMap::new(),
            nft_allowances: BTreeMap::new(),
            num_associations: 0,
        }
    }
}

impl Account {
    pub fn with_balance(balance: i64) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Apply a signed delta to the hbar allowance granted to `spender`.
    ///
    /// An absent entry is treated as the raw delta. A resulting amount of
    /// exactly zero removes the entry; anything else is upserted. Overflow
    /// of the adjusted amount is an internal-consistency error.
    pub fn adjust_crypto_allowance(
        &mut self,
        spender: EntityNum,
        delta: i64,
    ) -> Result<(), LedgerError> {
        adjust_amount_entry(&mut self.crypto_allowances, spender, delta)
    }

    /// Apply a signed delta to the fungible allowance granted to `spender`
    /// for `token`, with the same zero-removal rule as hbar allowances.
    pub fn adjust_fungible_allowance(
        &mut self,
        token: EntityNum,
        spender: EntityNum,
        delta: i64,
    ) -> Result<(), LedgerError> {
        let key = EntityNumPair::token_spender(token, spender);
        adjust_amount_entry(&mut self.fungible_allowances, key, delta)
    }

    /// Consume one serial from an explicit NFT allowance after a transfer.
    ///
    /// Approved-for-all entries are untouched; serial-level consumption does
    /// not affect them. When the explicit serial set empties, the whole
    /// entry is removed.
    pub fn consume_nft_allowance(&mut self, token: EntityNum, spender: EntityNum, serial: u64) {
        let key = EntityNumPair::token_spender(token, spender);
        if let Some(allowance) = self.nft_allowances.get_mut(&key) {
            if allowance.approved_for_all {
                return;
            }
            allowance.serials.remove(&serial);
            if allowance.serials.is_empty() {
                self.nft_allowances.remove(&key);
            }
        }
    }
}

fn adjust_amount_entry<K: Ord + Debug>(
    map: &mut BTreeMap<K, i64>,
    key: K,
    delta: i64,
) -> Result<(), LedgerError> {
    let current = map.get(&key).copied().unwrap_or(0);
    let amount = current.checked_add(delta).ok_or_else(|| {
        LedgerError::InternalConsistency(format!(
            "allowance adjustment overflow for {key:?}: {current} + {delta}"
        ))
    })?;
    if amount == 0 {
        map.remove(&key);
    } else {
        map.insert(key, amount);
    }
    Ok(())
}

/// Relationship between one account and one fungible token, keyed in its
/// store by `EntityNumPair::account_token`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRelationship {
    pub balance: i64,
    pub frozen: bool,
    pub kyc_granted: bool,
}

impl TokenRelationship {
    pub fn with_balance(balance: i64) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }
}

/// A minted NFT, keyed in its store by [`NftId`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub owner: EntityNum,
    /// Spender approved for this specific serial; 0 when none.
    pub spender: EntityNum,
}

impl Nft {
    pub fn owned_by(owner: EntityNum) -> Self {
        Self { owner, spender: 0 }
    }

    pub fn id(token_num: u64, serial: u64) -> NftId {
        NftId::new(token_num, serial)
    }
}

/// Fixed-capacity, most-recent-first ring of per-day reward-sum entries.
///
/// `get(0)` is the sum through the end of the last closed period. Shifting
/// pushes a new leading entry and drops the oldest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardHistory {
    sums: Vec<i64>,
}

impl Default for RewardHistory {
    fn default() -> Self {
        Self {
            sums: vec![0; REWARD_HISTORY_LEN],
        }
    }
}

impl RewardHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward sum `days_ago` periods back. Panics on an index outside the
    /// retained window; callers clamp stake periods before indexing.
    pub fn get(&self, days_ago: usize) -> i64 {
        assert!(
            days_ago < REWARD_HISTORY_LEN,
            "reward history index {days_ago} outside retained window"
        );
        self.sums[days_ago]
    }

    /// Close a period: the new leading sum is the previous leading sum plus
    /// the period's per-hbar reward rate.
    pub fn shift(&mut self, period_rate: i64) {
        let new_top = self.sums[0] + period_rate;
        self.sums.pop();
        self.sums.insert(0, new_top);
    }
}

/// Per-consensus-node staking state, recomputed once per staking period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingInfo {
    /// Hbars staked to this node by accounts accepting rewards.
    pub stake_to_reward: i64,
    /// Hbars staked to this node by accounts declining rewards.
    pub stake_to_not_reward: i64,
    pub min_stake: i64,
    pub max_stake: i64,
    /// Effective stake after min/max clamping, set at period end.
    pub stake: i64,
    /// Portion of `stake_to_reward` counted for the period's rewards.
    pub stake_reward_start: i64,
    pub reward_sum_history: RewardHistory,
}

impl StakingInfo {
    pub fn with_bounds(min_stake: i64, max_stake: i64) -> Self {
        Self {
            min_stake,
            max_stake,
            reward_sum_history: RewardHistory::new(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_allowance_zero_removal() {
        let mut account = Account::with_balance(100);
        account.adjust_crypto_allowance(55, 40).unwrap();
        assert_eq!(account.crypto_allowances.get(&55), Some(&40));

        account.adjust_crypto_allowance(55, -15).unwrap();
        assert_eq!(account.crypto_allowances.get(&55), Some(&25));

        account.adjust_crypto_allowance(55, -25).unwrap();
        assert!(!account.crypto_allowances.contains_key(&55));
    }

    #[test]
    fn test_fungible_allowance_absent_entry_takes_raw_delta() {
        let mut account = Account::with_balance(0);
        account.adjust_fungible_allowance(7, 9, -30).unwrap();
        let key = EntityNumPair::token_spender(7, 9);
        assert_eq!(account.fungible_allowances.get(&key), Some(&-30));

        account.adjust_fungible_allowance(7, 9, 30).unwrap();
        assert!(account.fungible_allowances.is_empty());
    }

    #[test]
    fn test_allowance_adjustment_overflow_is_fatal() {
        let mut account = Account::with_balance(0);
        account.adjust_crypto_allowance(55, i64::MAX).unwrap();
        let err = account.adjust_crypto_allowance(55, 1).unwrap_err();
        assert!(err.is_fatal());
        // The stored amount is untouched by the failed adjustment.
        assert_eq!(account.crypto_allowances.get(&55), Some(&i64::MAX));
    }

    #[test]
    fn test_nft_allowance_serial_consumption() {
        let mut account = Account::with_balance(0);
        let key = EntityNumPair::token_spender(4, 8);
        account
            .nft_allowances
            .insert(key, NftAllowance::for_serials([1, 2]));

        account.consume_nft_allowance(4, 8, 1);
        assert_eq!(
            account.nft_allowances.get(&key).unwrap().serials,
            BTreeSet::from([2])
        );

        account.consume_nft_allowance(4, 8, 2);
        assert!(!account.nft_allowances.contains_key(&key));
    }

    #[test]
    fn test_approved_for_all_survives_serial_consumption() {
        let mut account = Account::with_balance(0);
        let key = EntityNumPair::token_spender(4, 8);
        account
            .nft_allowances
            .insert(key, NftAllowance::approved_for_all());

        account.consume_nft_allowance(4, 8, 77);
        let entry = account.nft_allowances.get(&key).unwrap();
        assert!(entry.approved_for_all);
        assert!(entry.serials.is_empty());
    }

    #[test]
    fn test_reward_history_shift_accumulates_at_front() {
        let mut history = RewardHistory::new();
        history.shift(10);
        history.shift(5);
        assert_eq!(history.get(0), 15);
        assert_eq!(history.get(1), 10);
        assert_eq!(history.get(2), 0);
    }

    #[test]
    #[should_panic(expected = "outside retained window")]
    fn test_reward_history_bounds_checked() {
        RewardHistory::new().get(REWARD_HISTORY_LEN);
    }
}
