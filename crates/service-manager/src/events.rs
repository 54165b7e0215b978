//! Notifications emitted after each successful state change.

use opset_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::*;

/// Something observable happened to the service manager.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServiceEvent {
    MetadataUriUpdated {
        uri: String,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    RewardsInitiatorUpdated {
        previous: Address,
        new: Address,
    },
    ClaimerSet {
        claimer: Address,
    },
    RewardsSubmissionsCreated {
        count: usize,
    },
    OperatorDirectedRewardsSubmissionsCreated {
        count: usize,
    },
    OperatorRegistered {
        operator: Address,
    },
    OperatorDeregistered {
        operator: Address,
    },
    /// Operator sets were created and/or populated.
    OperatorsMigrated {
        operator_sets_created: usize,
        operators: usize,
    },
    MigrationFinalized,
}

/// Observer for [`ServiceEvent`]s.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait ServiceEventSink: Send + Sync {
    fn emit(&self, event: &ServiceEvent);
}

/// Default sink that records every event as a structured log line.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingEventSink;

impl ServiceEventSink for TracingEventSink {
    fn emit(&self, event: &ServiceEvent) {
        match event {
            ServiceEvent::MetadataUriUpdated { uri } => {
                info!(%uri, "metadata uri updated")
            }
            ServiceEvent::OwnershipTransferred { previous, new } => {
                info!(%previous, %new, "ownership transferred")
            }
            ServiceEvent::RewardsInitiatorUpdated { previous, new } => {
                info!(%previous, %new, "rewards initiator updated")
            }
            ServiceEvent::ClaimerSet { claimer } => info!(%claimer, "claimer set"),
            ServiceEvent::RewardsSubmissionsCreated { count } => {
                info!(%count, "rewards submissions forwarded")
            }
            ServiceEvent::OperatorDirectedRewardsSubmissionsCreated { count } => {
                info!(%count, "operator-directed rewards submissions forwarded")
            }
            ServiceEvent::OperatorRegistered { operator } => {
                info!(%operator, "operator registered")
            }
            ServiceEvent::OperatorDeregistered { operator } => {
                info!(%operator, "operator deregistered")
            }
            ServiceEvent::OperatorsMigrated {
                operator_sets_created,
                operators,
            } => info!(%operator_sets_created, %operators, "operators migrated to operator sets"),
            ServiceEvent::MigrationFinalized => info!("operator-set migration finalized"),
        }
    }
}
