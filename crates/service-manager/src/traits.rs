//! Contracts of the external services the service manager calls into.
//!
//! Every handle is bound to the service manager's own identity: calls made through it act as
//! the service (the directory sees the service as the operator-set authority, the token ledger
//! spends and approves on the service's behalf). All calls are synchronous and either return a
//! value or fail the whole invocation.

use std::{fmt, sync::Arc};

use opset_primitives::{
    Address, OperatorDirectedRewardsSubmission, OperatorId, OperatorSetAssignment,
    OperatorSetId, OperatorSignature, QuorumBitmap, QuorumNumber, RewardsSubmission,
    StrategyParam, U256,
};
use thiserror::Error;

/// Block number used as the reference point of an operator snapshot.
pub type BlockNumber = u32;

/// The external service a failed call was made to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Collaborator {
    Directory,
    RewardsCoordinator,
    TokenLedger,
    RegistryCoordinator,
    StakeRegistry,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::Directory => "directory",
            Collaborator::RewardsCoordinator => "rewards coordinator",
            Collaborator::TokenLedger => "token ledger",
            Collaborator::RegistryCoordinator => "registry coordinator",
            Collaborator::StakeRegistry => "stake registry",
        };
        f.write_str(name)
    }
}

/// A call to an external service failed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{collaborator} call '{call}' failed: {reason}")]
pub struct CollaboratorError {
    pub collaborator: Collaborator,
    pub call: &'static str,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: Collaborator, call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            call,
            reason: reason.into(),
        }
    }
}

/// Directory of operators and operator sets.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait OperatorSetDirectory: Send + Sync {
    /// Publishes the service's metadata URI.
    fn update_metadata_uri(&self, uri: &str) -> Result<(), CollaboratorError>;

    /// Registers `operator` with the service.
    fn register_operator(
        &self,
        operator: Address,
        signature: &OperatorSignature,
    ) -> Result<(), CollaboratorError>;

    /// Deregisters `operator` from the service.
    fn deregister_operator(&self, operator: Address) -> Result<(), CollaboratorError>;

    /// Switches the service to the operator-set model.
    fn become_operator_set_authority(&self) -> Result<(), CollaboratorError>;

    /// Creates one operator set per id.
    fn create_operator_sets(&self, operator_set_ids: &[OperatorSetId])
        -> Result<(), CollaboratorError>;

    /// Adds each operator to its operator sets. `operators[i]` joins `operator_set_ids[i]`.
    fn migrate_operators(
        &self,
        operators: &[Address],
        operator_set_ids: &[OperatorSetAssignment],
    ) -> Result<(), CollaboratorError>;
}

/// Receives rewards submissions and pulls the approved tokens from the service.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait RewardsCoordinator: Send + Sync {
    /// Address the service approves token spending for.
    fn address(&self) -> Address;

    fn create_rewards_submission(
        &self,
        submissions: &[RewardsSubmission],
    ) -> Result<(), CollaboratorError>;

    fn create_operator_directed_rewards_submission(
        &self,
        submissions: &[OperatorDirectedRewardsSubmission],
    ) -> Result<(), CollaboratorError>;

    /// Designates the account allowed to claim rewards earned by the service.
    fn set_claimer_for(&self, claimer: Address) -> Result<(), CollaboratorError>;
}

/// Standard fungible-token primitives, invoked as the service.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, token: Address, holder: Address) -> Result<U256, CollaboratorError>;

    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CollaboratorError>;

    /// Moves `amount` from `from` to `to`, spending the allowance `from` granted the service.
    fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CollaboratorError>;

    /// Sets the allowance the service grants `spender` to exactly `amount`.
    fn approve(&self, token: Address, spender: Address, amount: U256)
        -> Result<(), CollaboratorError>;
}

/// Registry of quorums and the operators registered in them.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait RegistryCoordinator: Send + Sync {
    /// Number of quorums created so far. Quorums are numbered `0..count`.
    fn quorum_count(&self) -> Result<u8, CollaboratorError>;

    /// Block the registry's current state corresponds to.
    fn current_block(&self) -> Result<BlockNumber, CollaboratorError>;

    /// Operators registered in `quorum` at `block`.
    ///
    /// Resolving the returned identities through [`Self::resolve_address`] yields strictly
    /// ascending addresses.
    fn operator_snapshot(
        &self,
        quorum: QuorumNumber,
        block: BlockNumber,
    ) -> Result<Vec<OperatorId>, CollaboratorError>;

    fn resolve_address(&self, operator_id: OperatorId) -> Result<Address, CollaboratorError>;

    /// Identity of `operator`, or the zero id if it never registered.
    fn operator_id(&self, operator: Address) -> Result<OperatorId, CollaboratorError>;

    /// Current quorum membership of the operator. Unknown operators have an empty bitmap.
    fn current_bitmap(&self, operator_id: OperatorId) -> Result<QuorumBitmap, CollaboratorError>;
}

/// Per-quorum strategy parameters.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait StakeRegistry: Send + Sync {
    fn strategy_param_count(&self, quorum: QuorumNumber) -> Result<usize, CollaboratorError>;

    fn strategy_param_at(
        &self,
        quorum: QuorumNumber,
        index: usize,
    ) -> Result<StrategyParam, CollaboratorError>;
}

/// Handles to every collaborator, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn OperatorSetDirectory>,
    pub rewards_coordinator: Arc<dyn RewardsCoordinator>,
    pub tokens: Arc<dyn TokenLedger>,
    pub registry: Arc<dyn RegistryCoordinator>,
    pub stake_registry: Arc<dyn StakeRegistry>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
