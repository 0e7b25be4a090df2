//! # ledger-exec
//!
//! Executable accounting semantics over the transactional stores.
//!
//! ## Role in System
//!
//! - [`TransferLogic`]: applies a batch of [`BalanceChange`]s across the
//!   account, token-relationship, and NFT stores as one all-or-nothing
//!   operation, including implicit account auto-creation and allowance
//!   consumption
//! - Commit interceptors: zero-sum defense-in-depth on the account store,
//!   staking-reward accrual, NFT ownership side-effect extraction
//! - [`StakeAccrual`]: per-transaction reward computation and the
//!   once-per-period network-wide stake recomputation
//!
//! External collaborators (token validity, scoped account checks,
//! auto-creation, record persistence) are consumed through `ports`; the
//! in-memory `adapters` are enough to run the full execution path.

pub mod adapters;
pub mod domain;
pub mod logging;
pub mod ports;

pub use domain::{
    AccountsStore, BalanceChange, EpochDayClock, NftOwnershipInterceptor, NftStore,
    SideEffectsTracker, StakeAccrual, StakingConfig, StakingRewardsInterceptor, TokenRelStore,
    TransferLogic, Units, ZeroSumInterceptor,
};
pub use ports::{AutoCreation, RecordsHistorian, ScopedCheck, TokenValidity};
