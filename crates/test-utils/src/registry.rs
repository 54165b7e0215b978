use opset_primitives::{Address, OperatorId, QuorumBitmap, QuorumNumber, StrategyParam};
use opset_service_manager::{
    BlockNumber, Collaborator, CollaboratorError, RegistryCoordinator, RegistrySnapshot,
    SnapshotDocument, SnapshotError, StakeRegistry,
};
use parking_lot::Mutex;

use crate::failures::FailureInjector;

/// Registry and stake registry backed by a [`RegistrySnapshot`].
///
/// Calls can be made to fail, and the snapshot can be swapped out mid-test to simulate the
/// registry changing between two runs.
#[derive(Debug)]
pub struct InMemoryRegistry {
    snapshot: Mutex<RegistrySnapshot>,
    registry_failures: FailureInjector,
    stake_failures: FailureInjector,
}

impl InMemoryRegistry {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            registry_failures: FailureInjector::new(Collaborator::RegistryCoordinator),
            stake_failures: FailureInjector::new(Collaborator::StakeRegistry),
        }
    }

    pub fn from_document(doc: SnapshotDocument) -> Result<Self, SnapshotError> {
        Ok(Self::new(RegistrySnapshot::try_from(doc)?))
    }

    pub fn replace_snapshot(&self, snapshot: RegistrySnapshot) {
        *self.snapshot.lock() = snapshot;
    }

    /// Failure injection for [`RegistryCoordinator`] calls.
    pub fn registry_failures(&self) -> &FailureInjector {
        &self.registry_failures
    }

    /// Failure injection for [`StakeRegistry`] calls.
    pub fn stake_failures(&self) -> &FailureInjector {
        &self.stake_failures
    }
}

impl RegistryCoordinator for InMemoryRegistry {
    fn quorum_count(&self) -> Result<u8, CollaboratorError> {
        self.registry_failures.check("quorum_count")?;
        self.snapshot.lock().quorum_count()
    }

    fn current_block(&self) -> Result<BlockNumber, CollaboratorError> {
        self.registry_failures.check("current_block")?;
        self.snapshot.lock().current_block()
    }

    fn operator_snapshot(
        &self,
        quorum: QuorumNumber,
        block: BlockNumber,
    ) -> Result<Vec<OperatorId>, CollaboratorError> {
        self.registry_failures.check("operator_snapshot")?;
        self.snapshot.lock().operator_snapshot(quorum, block)
    }

    fn resolve_address(&self, operator_id: OperatorId) -> Result<Address, CollaboratorError> {
        self.registry_failures.check("resolve_address")?;
        self.snapshot.lock().resolve_address(operator_id)
    }

    fn operator_id(&self, operator: Address) -> Result<OperatorId, CollaboratorError> {
        self.registry_failures.check("operator_id")?;
        self.snapshot.lock().operator_id(operator)
    }

    fn current_bitmap(&self, operator_id: OperatorId) -> Result<QuorumBitmap, CollaboratorError> {
        self.registry_failures.check("current_bitmap")?;
        self.snapshot.lock().current_bitmap(operator_id)
    }
}

impl StakeRegistry for InMemoryRegistry {
    fn strategy_param_count(&self, quorum: QuorumNumber) -> Result<usize, CollaboratorError> {
        self.stake_failures.check("strategy_param_count")?;
        self.snapshot.lock().strategy_param_count(quorum)
    }

    fn strategy_param_at(
        &self,
        quorum: QuorumNumber,
        index: usize,
    ) -> Result<StrategyParam, CollaboratorError> {
        self.stake_failures.check("strategy_param_at")?;
        self.snapshot.lock().strategy_param_at(quorum, index)
    }
}
