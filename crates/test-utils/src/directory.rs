use opset_primitives::{Address, OperatorSetAssignment, OperatorSetId, OperatorSignature};
use opset_service_manager::{Collaborator, CollaboratorError, OperatorSetDirectory};
use parking_lot::Mutex;

use crate::failures::FailureInjector;

/// A call received by [`RecordingDirectory`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectoryCall {
    UpdateMetadataUri(String),
    RegisterOperator(Address),
    DeregisterOperator(Address),
    BecomeOperatorSetAuthority,
    CreateOperatorSets(Vec<OperatorSetId>),
    MigrateOperators {
        operators: Vec<Address>,
        operator_set_ids: Vec<OperatorSetAssignment>,
    },
}

/// Directory that records every call it accepts, in order.
///
/// A call that was set to fail is not recorded.
#[derive(Debug)]
pub struct RecordingDirectory {
    calls: Mutex<Vec<DirectoryCall>>,
    failures: FailureInjector,
}

impl Default for RecordingDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: FailureInjector::new(Collaborator::Directory),
        }
    }

    pub fn failures(&self) -> &FailureInjector {
        &self.failures
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().clone()
    }

    /// Returns whether the service was ever made an operator-set authority.
    pub fn is_operator_set_authority(&self) -> bool {
        self.calls
            .lock()
            .contains(&DirectoryCall::BecomeOperatorSetAuthority)
    }

    /// Operator sets created so far, in creation order.
    pub fn created_operator_sets(&self) -> Vec<OperatorSetId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DirectoryCall::CreateOperatorSets(ids) => Some(ids.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, call: &'static str, entry: DirectoryCall) -> Result<(), CollaboratorError> {
        self.failures.check(call)?;
        self.calls.lock().push(entry);
        Ok(())
    }
}

impl OperatorSetDirectory for RecordingDirectory {
    fn update_metadata_uri(&self, uri: &str) -> Result<(), CollaboratorError> {
        self.record(
            "update_metadata_uri",
            DirectoryCall::UpdateMetadataUri(uri.to_string()),
        )
    }

    fn register_operator(
        &self,
        operator: Address,
        _signature: &OperatorSignature,
    ) -> Result<(), CollaboratorError> {
        self.record(
            "register_operator",
            DirectoryCall::RegisterOperator(operator),
        )
    }

    fn deregister_operator(&self, operator: Address) -> Result<(), CollaboratorError> {
        self.record(
            "deregister_operator",
            DirectoryCall::DeregisterOperator(operator),
        )
    }

    fn become_operator_set_authority(&self) -> Result<(), CollaboratorError> {
        self.record(
            "become_operator_set_authority",
            DirectoryCall::BecomeOperatorSetAuthority,
        )
    }

    fn create_operator_sets(
        &self,
        operator_set_ids: &[OperatorSetId],
    ) -> Result<(), CollaboratorError> {
        self.record(
            "create_operator_sets",
            DirectoryCall::CreateOperatorSets(operator_set_ids.to_vec()),
        )
    }

    fn migrate_operators(
        &self,
        operators: &[Address],
        operator_set_ids: &[OperatorSetAssignment],
    ) -> Result<(), CollaboratorError> {
        self.record(
            "migrate_operators",
            DirectoryCall::MigrateOperators {
                operators: operators.to_vec(),
                operator_set_ids: operator_set_ids.to_vec(),
            },
        )
    }
}
