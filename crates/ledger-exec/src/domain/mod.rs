//! Execution-layer domain logic.

mod change;
mod interceptors;
mod records;
mod side_effects;
mod staking;
mod transfer;

pub use change::{BalanceChange, Units};
pub use interceptors::{NftOwnershipInterceptor, ZeroSumInterceptor};
pub use records::{AutoCreationRecord, NftExchange, NodeStake, NodeStakeUpdateRecord, TransferListRecord};
pub use side_effects::SideEffectsTracker;
pub use staking::{EpochDayClock, StakeAccrual, StakingConfig, StakingRewardsInterceptor};
pub use transfer::TransferLogic;

use ledger_store::TransactionalStore;
use ledger_types::{Account, EntityNum, EntityNumPair, Nft, NftId, TokenRelationship};

/// The three stores TransferLogic opens transactions across. No other
/// component may hold transactions on all three at once.
pub type AccountsStore = TransactionalStore<EntityNum, Account>;
pub type TokenRelStore = TransactionalStore<EntityNumPair, TokenRelationship>;
pub type NftStore = TransactionalStore<NftId, Nft>;
