//! Value types shared by the operator-set service manager crates.
//!
//! Addresses and hashes come from `alloy-primitives`; everything quorum-specific (membership
//! bitmaps, strategy parameters, reward submissions, authority roles) is defined here.

pub mod bitmap;
pub mod operator;
pub mod rewards;
pub mod roles;
pub mod strategy;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use bitmap::{BitmapError, QuorumBitmap, QuorumNumber, MAX_QUORUM_COUNT};
pub use operator::{OperatorId, OperatorSetAssignment, OperatorSetId, OperatorSignature};
pub use rewards::{OperatorDirectedRewardsSubmission, OperatorReward, RewardsSubmission};
pub use roles::Role;
pub use strategy::{StrategyAndMultiplier, StrategyParam};
