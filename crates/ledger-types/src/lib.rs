//! # ledger-types
//!
//! Shared primitive types for the ledger accounting core.
//!
//! ## Contents
//!
//! - Entity identifiers and the two composite-key encodings (fixed-width
//!   packed pair, variable-length NFT key)
//! - Persistent entities: accounts, token relationships, NFTs, per-node
//!   staking info
//! - Validity codes for user-recoverable transaction failures
//! - The error taxonomy shared by every crate in the workspace

pub mod entities;
pub mod errors;
pub mod keys;
pub mod validity;

pub use entities::{
    Account, Nft, NftAllowance, RewardHistory, StakedId, StakingInfo, TokenRelationship,
    REWARD_HISTORY_LEN,
};
pub use errors::LedgerError;
pub use keys::{EntityNum, EntityNumPair, NftId, KEY_CODEC_VERSION};
pub use validity::ValidityCode;
