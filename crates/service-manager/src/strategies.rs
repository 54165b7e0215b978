//! Read-only aggregation of the strategies backing quorums and operators.

use std::fmt;

use opset_primitives::{Address, QuorumNumber};
use tracing::*;

use crate::{
    migration::{checked_bitmap, checked_quorum_count},
    traits::{Collaborator, CollaboratorError, RegistryCoordinator, StakeRegistry},
};

/// Upper bound on the up-front allocation for a strategy listing.
const MAX_RESERVED_STRATEGIES: usize = 1024;

/// Answers which strategies may be restaked into the service.
pub struct RestakeableStrategyQuery<'a> {
    registry: &'a dyn RegistryCoordinator,
    stake_registry: &'a dyn StakeRegistry,
}

impl fmt::Debug for RestakeableStrategyQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestakeableStrategyQuery").finish_non_exhaustive()
    }
}

impl<'a> RestakeableStrategyQuery<'a> {
    pub fn new(
        registry: &'a dyn RegistryCoordinator,
        stake_registry: &'a dyn StakeRegistry,
    ) -> Self {
        Self {
            registry,
            stake_registry,
        }
    }

    /// Strategies of every quorum, in quorum order and then strategy-index order.
    ///
    /// A strategy configured for several quorums appears once per quorum.
    pub fn restakeable_strategies(&self) -> Result<Vec<Address>, CollaboratorError> {
        let quorum_count = checked_quorum_count(self.registry)?;
        self.strategies_of(0..quorum_count)
    }

    /// Strategies of the quorums `operator` is currently registered in.
    ///
    /// Empty for operators that are not registered in any quorum.
    pub fn operator_restaked_strategies(
        &self,
        operator: Address,
    ) -> Result<Vec<Address>, CollaboratorError> {
        let quorum_count = checked_quorum_count(self.registry)?;
        if quorum_count == 0 {
            return Ok(Vec::new());
        }

        let bitmap = checked_bitmap(self.registry, operator, quorum_count)?;
        if bitmap.is_empty() {
            debug!(%operator, "operator is not registered in any quorum");
            return Ok(Vec::new());
        }

        self.strategies_of(bitmap.iter())
    }

    fn strategies_of(
        &self,
        quorums: impl Iterator<Item = QuorumNumber>,
    ) -> Result<Vec<Address>, CollaboratorError> {
        let mut counts = Vec::new();
        for quorum in quorums {
            counts.push((quorum, self.stake_registry.strategy_param_count(quorum)?));
        }

        let mut total: usize = 0;
        for (quorum, count) in &counts {
            total = total.checked_add(*count).ok_or_else(|| {
                CollaboratorError::new(
                    Collaborator::StakeRegistry,
                    "strategy_param_count",
                    format!("strategy count of quorum {quorum} overflows the total"),
                )
            })?;
        }

        // Counts come from the registry, so they only bound the reservation.
        let mut strategies = Vec::with_capacity(total.min(MAX_RESERVED_STRATEGIES));
        for (quorum, count) in counts {
            for index in 0..count {
                let param = self.stake_registry.strategy_param_at(quorum, index)?;
                strategies.push(param.strategy);
            }
        }

        trace!(count = strategies.len(), "collected restakeable strategies");
        Ok(strategies)
    }
}
