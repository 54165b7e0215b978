//! Strategy parameters a quorum is weighted by.

use alloy_primitives::Address;
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// One strategy configured for a quorum in the stake registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Arbitrary, Serialize, Deserialize)]
pub struct StrategyParam {
    /// Address of the strategy contract.
    pub strategy: Address,

    /// Weight applied to shares in this strategy. Stored as a 96-bit value by the registry.
    pub multiplier: u128,
}

impl StrategyParam {
    pub fn new(strategy: Address, multiplier: u128) -> Self {
        Self {
            strategy,
            multiplier,
        }
    }
}

/// Strategy and weight pair attached to a rewards submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Arbitrary, Serialize, Deserialize)]
pub struct StrategyAndMultiplier {
    pub strategy: Address,
    pub multiplier: u128,
}

impl From<StrategyParam> for StrategyAndMultiplier {
    fn from(param: StrategyParam) -> Self {
        Self {
            strategy: param.strategy,
            multiplier: param.multiplier,
        }
    }
}
