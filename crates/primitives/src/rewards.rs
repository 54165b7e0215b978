//! Rewards submissions forwarded to the rewards coordinator.

use alloy_primitives::{Address, U256};
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

use crate::strategy::StrategyAndMultiplier;

/// A rewards distribution to every operator staked in the listed strategies, proportional to
/// stake.
#[derive(Clone, Debug, Eq, PartialEq, Arbitrary, Serialize, Deserialize)]
pub struct RewardsSubmission {
    pub strategies_and_multipliers: Vec<StrategyAndMultiplier>,

    /// Token the reward is paid in.
    pub token: Address,

    /// Total amount of `token` distributed by this submission.
    pub amount: U256,

    /// Start of the rewards period, in seconds since the unix epoch.
    pub start_timestamp: u32,

    /// Length of the rewards period, in seconds.
    pub duration: u32,
}

/// Amount owed to one operator by an operator-directed submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary, Serialize, Deserialize)]
pub struct OperatorReward {
    pub operator: Address,
    pub amount: U256,
}

/// A rewards distribution with explicit per-operator amounts.
#[derive(Clone, Debug, Eq, PartialEq, Arbitrary, Serialize, Deserialize)]
pub struct OperatorDirectedRewardsSubmission {
    pub strategies_and_multipliers: Vec<StrategyAndMultiplier>,
    pub token: Address,
    pub operator_rewards: Vec<OperatorReward>,
    pub start_timestamp: u32,
    pub duration: u32,
    pub description: String,
}

impl OperatorDirectedRewardsSubmission {
    /// Sum of all operator rewards, or `None` if it overflows.
    pub fn total_amount(&self) -> Option<U256> {
        self.operator_rewards
            .iter()
            .try_fold(U256::ZERO, |acc, r| acc.checked_add(r.amount))
    }
}
