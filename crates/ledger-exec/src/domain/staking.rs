//! # Staking Accrual
//!
//! Two halves, both driven by the epoch day (UTC day number):
//!
//! - Per-transaction: [`StakeAccrual::compute_and_apply_rewards`] settles
//!   the reward an account earned for periods before yesterday, invoked by
//!   [`StakingRewardsInterceptor`] for every account flowing through the
//!   account store's commit.
//! - Per-period: [`StakeAccrual::update_nodes`] closes a staking period for
//!   the whole network: shifts every node's reward-sum history, reclamps
//!   effective stakes, and emits one synthetic record for downstream
//!   consumers.
//!
//! ## Eligibility policy
//!
//! A `stake_period_start` of `today` or `today - 1` earns nothing: today's
//! period has not closed, and yesterday's is credited only once its history
//! entry exists. Only starts strictly before `today - 1` pay out.

use crate::domain::records::{NodeStake, NodeStakeUpdateRecord};
use crate::ports::RecordsHistorian;
use ledger_store::{BackingStore, ChangeSet, CommitInterceptor, PendingChange};
use ledger_types::{Account, EntityNum, LedgerError, StakedId, StakingInfo};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Days of reward history an account can catch up on at once.
const MAX_PERIODS_CLAIMABLE: i64 = 365;

/// Shared handle to the current epoch day, advanced by the node as
/// consensus time progresses.
#[derive(Clone)]
pub struct EpochDayClock {
    day: Rc<Cell<i64>>,
}

impl EpochDayClock {
    pub fn starting_at(day: i64) -> Self {
        Self {
            day: Rc::new(Cell::new(day)),
        }
    }

    pub fn today(&self) -> i64 {
        self.day.get()
    }

    pub fn advance_to(&self, day: i64) {
        self.day.set(day);
    }
}

#[derive(Clone, Debug)]
pub struct StakingConfig {
    /// Account funding staking rewards (debited as rewards are paid).
    pub reward_account: EntityNum,
    /// Configured cap on the per-period reward rate.
    pub max_daily_reward_rate: i64,
}

/// Network staking state: per-node info plus the running
/// total-staked-for-reward figure used to spread the period's rate.
pub struct StakeAccrual {
    config: StakingConfig,
    rewards_activated: bool,
    infos: BTreeMap<u64, StakingInfo>,
    total_staked_reward_start: i64,
}

impl StakeAccrual {
    pub fn new(config: StakingConfig) -> Self {
        Self {
            config,
            rewards_activated: false,
            infos: BTreeMap::new(),
            total_staked_reward_start: 0,
        }
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Rewards stay inert until the network activates them; before that,
    /// accrual computes nothing and period updates are skipped entirely.
    pub fn activate_rewards(&mut self) {
        self.rewards_activated = true;
    }

    pub fn rewards_activated(&self) -> bool {
        self.rewards_activated
    }

    pub fn add_node(&mut self, node_id: u64, info: StakingInfo) {
        self.total_staked_reward_start += info.stake_reward_start;
        self.infos.insert(node_id, info);
    }

    pub fn node(&self, node_id: u64) -> Option<&StakingInfo> {
        self.infos.get(&node_id)
    }

    pub fn node_mut(&mut self, node_id: u64) -> Option<&mut StakingInfo> {
        self.infos.get_mut(&node_id)
    }

    /// Settle the reward owed to `account` for closed periods and mark it
    /// rewarded through yesterday. Returns the reward; the caller credits
    /// it and debits the funding account. A reward that overflows `i64` is
    /// an internal-consistency error.
    pub fn compute_and_apply_rewards(
        &self,
        account: &mut Account,
        today: i64,
    ) -> Result<i64, LedgerError> {
        if !self.rewards_activated || account.stake_period_start < 0 {
            return Ok(0);
        }
        if account.stake_period_start < today - MAX_PERIODS_CLAIMABLE {
            account.stake_period_start = today - MAX_PERIODS_CLAIMABLE;
        }
        if account.stake_period_start >= today - 1 {
            // Already credited, or yesterday's period not yet claimable.
            return Ok(0);
        }

        let reward = if account.decline_reward {
            0
        } else if let StakedId::ToNode(node_id) = account.staked_id {
            match self.infos.get(&node_id) {
                Some(info) => {
                    let days_back = (today - 1 - (account.stake_period_start - 1)) as usize;
                    let rate_diff = info.reward_sum_history.get(0)
                        - info.reward_sum_history.get(days_back);
                    account.balance.checked_mul(rate_diff).ok_or_else(|| {
                        LedgerError::InternalConsistency(format!(
                            "staking reward overflow: balance {} at rate diff {rate_diff}",
                            account.balance
                        ))
                    })?
                }
                None => {
                    tracing::warn!(
                        "[ledger] account staked to unknown node {node_id}, no reward"
                    );
                    0
                }
            }
        } else {
            0
        };

        account.stake_period_start = today - 1;
        Ok(reward)
    }

    /// Close the staking period ending at `today`.
    ///
    /// Skipped entirely until rewards are activated. The period's reward
    /// rate is the configured maximum capped at the funding account's
    /// balance, spread over the network's prior total-staked-for-reward.
    pub fn update_nodes(
        &mut self,
        today: i64,
        reward_account_balance: i64,
        historian: &mut dyn RecordsHistorian,
    ) {
        if !self.rewards_activated {
            tracing::debug!("[ledger] staking period end skipped, rewards not active");
            return;
        }
        let reward_rate = self
            .config
            .max_daily_reward_rate
            .min(reward_account_balance)
            .max(0);
        let per_unit_rate = if self.total_staked_reward_start > 0 {
            reward_rate / self.total_staked_reward_start
        } else {
            0
        };

        let mut new_total = 0;
        let mut stakes = Vec::with_capacity(self.infos.len());
        for (&node_id, info) in self.infos.iter_mut() {
            let node_rate = if info.stake_reward_start > 0 {
                per_unit_rate
            } else {
                0
            };
            info.reward_sum_history.shift(node_rate);

            let raw = info.stake_to_reward + info.stake_to_not_reward;
            info.stake = if raw >= info.max_stake {
                info.max_stake
            } else if raw < info.min_stake {
                0
            } else {
                raw
            };
            info.stake_reward_start = info.stake_to_reward.min(info.stake);
            new_total += info.stake_reward_start;
            stakes.push(NodeStake {
                node_id,
                stake: info.stake,
                stake_rewarded: info.stake_reward_start,
            });
        }
        self.total_staked_reward_start = new_total;

        tracing::info!(
            "[ledger] staking period closed for day {today}: rate {reward_rate}, {} nodes",
            stakes.len()
        );
        historian.record_node_stakes(NodeStakeUpdateRecord {
            epoch_day: today,
            stakes,
        });
    }
}

/// Account-store interceptor that settles rewards as a correlated side
/// effect of balance/stake-metadata changes. Registered before the zero-sum
/// interceptor: reward credits and the matching funding-account debit land
/// in the same ChangeSet, so the batch still sums to zero.
pub struct StakingRewardsInterceptor {
    accrual: Rc<RefCell<StakeAccrual>>,
    clock: EpochDayClock,
}

impl StakingRewardsInterceptor {
    pub fn new(accrual: Rc<RefCell<StakeAccrual>>, clock: EpochDayClock) -> Self {
        Self { accrual, clock }
    }
}

impl CommitInterceptor<EntityNum, Account> for StakingRewardsInterceptor {
    fn preview(
        &mut self,
        changes: &mut ChangeSet<EntityNum, Account>,
        backing: &mut dyn BackingStore<EntityNum, Account>,
    ) -> Result<(), LedgerError> {
        let accrual = self.accrual.borrow();
        if !accrual.rewards_activated() {
            return Ok(());
        }
        let today = self.clock.today();
        let reward_account = accrual.config().reward_account;

        let mut total_rewards = 0;
        for id in changes.touched_ids() {
            if id == reward_account {
                continue;
            }
            if let Some(
                PendingChange::Created(account) | PendingChange::Updated(account),
            ) = changes.get_mut(&id)
            {
                let reward = accrual.compute_and_apply_rewards(account, today)?;
                if reward > 0 {
                    account.balance = account.balance.checked_add(reward).ok_or_else(|| {
                        LedgerError::InternalConsistency(format!(
                            "balance overflow crediting {reward} staking reward to {id}"
                        ))
                    })?;
                    total_rewards += reward;
                    tracing::debug!("[ledger] paid {reward} staking reward to account {id}");
                }
            }
        }

        if total_rewards > 0 {
            let funding = match changes.get(&reward_account) {
                Some(PendingChange::Created(account))
                | Some(PendingChange::Updated(account)) => account.clone(),
                Some(PendingChange::Removed) => {
                    return Err(LedgerError::InternalConsistency(
                        "reward funding account removed mid-batch".to_string(),
                    ))
                }
                None => backing.get(&reward_account).cloned().ok_or_else(|| {
                    LedgerError::InternalConsistency(format!(
                        "reward funding account {reward_account} does not exist"
                    ))
                })?,
            };
            if funding.balance < total_rewards {
                return Err(LedgerError::InternalConsistency(format!(
                    "reward funding account cannot cover {total_rewards} in rewards"
                )));
            }
            let mut debited = funding;
            debited.balance -= total_rewards;
            changes.record_update(reward_account, debited);
        }
        Ok(())
    }
}
