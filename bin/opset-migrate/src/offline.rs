//! Collaborators for running the service manager without a chain.
//!
//! The directory accepts and records every call; rewards and token calls are refused since the
//! tool never moves funds.

use opset_primitives::{
    Address, OperatorDirectedRewardsSubmission, OperatorSetAssignment, OperatorSetId,
    OperatorSignature, RewardsSubmission, U256,
};
use opset_service_manager::{
    Collaborator, CollaboratorError, OperatorSetDirectory, RewardsCoordinator, TokenLedger,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::*;

const OFFLINE: &str = "not available offline";

/// A call the service manager made on the directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub(crate) enum DryRunCall {
    UpdateMetadataUri {
        uri: String,
    },
    RegisterOperator {
        operator: Address,
    },
    DeregisterOperator {
        operator: Address,
    },
    BecomeOperatorSetAuthority,
    CreateOperatorSets {
        operator_set_ids: Vec<OperatorSetId>,
    },
    MigrateOperators {
        operators: Vec<Address>,
        operator_set_ids: Vec<OperatorSetAssignment>,
    },
}

impl DryRunCall {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            DryRunCall::UpdateMetadataUri { .. } => "update_metadata_uri",
            DryRunCall::RegisterOperator { .. } => "register_operator",
            DryRunCall::DeregisterOperator { .. } => "deregister_operator",
            DryRunCall::BecomeOperatorSetAuthority => "become_operator_set_authority",
            DryRunCall::CreateOperatorSets { .. } => "create_operator_sets",
            DryRunCall::MigrateOperators { .. } => "migrate_operators",
        }
    }
}

/// Directory that logs and keeps every call instead of submitting it.
#[derive(Debug, Default)]
pub(crate) struct DryRunDirectory {
    calls: Mutex<Vec<DryRunCall>>,
}

impl DryRunDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<DryRunCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: DryRunCall) -> Result<(), CollaboratorError> {
        info!(call = call.name(), "dry run: directory call");
        self.calls.lock().push(call);
        Ok(())
    }
}

impl OperatorSetDirectory for DryRunDirectory {
    fn update_metadata_uri(&self, uri: &str) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::UpdateMetadataUri {
            uri: uri.to_string(),
        })
    }

    fn register_operator(
        &self,
        operator: Address,
        _signature: &OperatorSignature,
    ) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::RegisterOperator { operator })
    }

    fn deregister_operator(&self, operator: Address) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::DeregisterOperator { operator })
    }

    fn become_operator_set_authority(&self) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::BecomeOperatorSetAuthority)
    }

    fn create_operator_sets(
        &self,
        operator_set_ids: &[OperatorSetId],
    ) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::CreateOperatorSets {
            operator_set_ids: operator_set_ids.to_vec(),
        })
    }

    fn migrate_operators(
        &self,
        operators: &[Address],
        operator_set_ids: &[OperatorSetAssignment],
    ) -> Result<(), CollaboratorError> {
        self.record(DryRunCall::MigrateOperators {
            operators: operators.to_vec(),
            operator_set_ids: operator_set_ids.to_vec(),
        })
    }
}

/// Rewards coordinator known only by its configured address.
#[derive(Debug)]
pub(crate) struct OfflineRewardsCoordinator {
    address: Address,
}

impl OfflineRewardsCoordinator {
    pub(crate) fn new(address: Address) -> Self {
        Self { address }
    }

    fn refuse(call: &'static str) -> CollaboratorError {
        CollaboratorError::new(Collaborator::RewardsCoordinator, call, OFFLINE)
    }
}

impl RewardsCoordinator for OfflineRewardsCoordinator {
    fn address(&self) -> Address {
        self.address
    }

    fn create_rewards_submission(
        &self,
        _submissions: &[RewardsSubmission],
    ) -> Result<(), CollaboratorError> {
        Err(Self::refuse("create_rewards_submission"))
    }

    fn create_operator_directed_rewards_submission(
        &self,
        _submissions: &[OperatorDirectedRewardsSubmission],
    ) -> Result<(), CollaboratorError> {
        Err(Self::refuse("create_operator_directed_rewards_submission"))
    }

    fn set_claimer_for(&self, _claimer: Address) -> Result<(), CollaboratorError> {
        Err(Self::refuse("set_claimer_for"))
    }
}

#[derive(Debug)]
pub(crate) struct OfflineTokenLedger;

impl OfflineTokenLedger {
    fn refuse(call: &'static str) -> CollaboratorError {
        CollaboratorError::new(Collaborator::TokenLedger, call, OFFLINE)
    }
}

impl TokenLedger for OfflineTokenLedger {
    fn balance_of(&self, _token: Address, _holder: Address) -> Result<U256, CollaboratorError> {
        Err(Self::refuse("balance_of"))
    }

    fn allowance(
        &self,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, CollaboratorError> {
        Err(Self::refuse("allowance"))
    }

    fn transfer_from(
        &self,
        _token: Address,
        _from: Address,
        _to: Address,
        _amount: U256,
    ) -> Result<(), CollaboratorError> {
        Err(Self::refuse("transfer_from"))
    }

    fn approve(
        &self,
        _token: Address,
        _spender: Address,
        _amount: U256,
    ) -> Result<(), CollaboratorError> {
        Err(Self::refuse("approve"))
    }
}
