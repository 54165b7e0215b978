use opset_primitives::{Address, OperatorDirectedRewardsSubmission, RewardsSubmission};
use opset_service_manager::{Collaborator, CollaboratorError, RewardsCoordinator};
use parking_lot::Mutex;

use crate::failures::FailureInjector;

#[derive(Debug, Default)]
struct Received {
    rewards: Vec<Vec<RewardsSubmission>>,
    operator_directed: Vec<Vec<OperatorDirectedRewardsSubmission>>,
    claimer: Option<Address>,
}

/// Rewards coordinator that keeps every batch it accepts.
#[derive(Debug)]
pub struct RecordingRewardsCoordinator {
    address: Address,
    received: Mutex<Received>,
    failures: FailureInjector,
}

impl RecordingRewardsCoordinator {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            received: Mutex::new(Received::default()),
            failures: FailureInjector::new(Collaborator::RewardsCoordinator),
        }
    }

    pub fn failures(&self) -> &FailureInjector {
        &self.failures
    }

    /// Batches of stake-proportional submissions, in the order received.
    pub fn rewards_batches(&self) -> Vec<Vec<RewardsSubmission>> {
        self.received.lock().rewards.clone()
    }

    pub fn operator_directed_batches(&self) -> Vec<Vec<OperatorDirectedRewardsSubmission>> {
        self.received.lock().operator_directed.clone()
    }

    pub fn claimer(&self) -> Option<Address> {
        self.received.lock().claimer
    }
}

impl RewardsCoordinator for RecordingRewardsCoordinator {
    fn address(&self) -> Address {
        self.address
    }

    fn create_rewards_submission(
        &self,
        submissions: &[RewardsSubmission],
    ) -> Result<(), CollaboratorError> {
        self.failures.check("create_rewards_submission")?;
        self.received.lock().rewards.push(submissions.to_vec());
        Ok(())
    }

    fn create_operator_directed_rewards_submission(
        &self,
        submissions: &[OperatorDirectedRewardsSubmission],
    ) -> Result<(), CollaboratorError> {
        self.failures
            .check("create_operator_directed_rewards_submission")?;
        self.received
            .lock()
            .operator_directed
            .push(submissions.to_vec());
        Ok(())
    }

    fn set_claimer_for(&self, claimer: Address) -> Result<(), CollaboratorError> {
        self.failures.check("set_claimer_for")?;
        self.received.lock().claimer = Some(claimer);
        Ok(())
    }
}
