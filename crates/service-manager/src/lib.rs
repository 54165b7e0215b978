//! Service manager for an operator-set staking service.
//!
//! The crate gates the service's administrative operations by caller identity, forwards rewards
//! submissions and operator registrations to the external coordinators, answers which strategies
//! back a quorum or an operator, and migrates quorum membership to operator sets.
//!
//! All external services are reached through the traits in [`traits`]. [`RegistrySnapshot`]
//! provides an offline registry for planning.

pub mod authority;
pub mod errors;
pub mod events;
pub mod manager;
pub mod merge;
pub mod migration;
pub mod rewards;
pub mod snapshot;
pub mod strategies;
pub mod traits;

pub use authority::AccessGate;
pub use errors::{
    AuthorizationError, InsufficientResourceError, MalformedInputError, ServiceManagerError,
};
pub use events::{ServiceEvent, ServiceEventSink, TracingEventSink};
pub use manager::ServiceManager;
pub use merge::{merge_sorted, merge_sorted_unique};
pub use migration::{assignment_from_bitmap, MigrationPlan, OperatorSetMigrator};
pub use rewards::RewardsForwarder;
pub use snapshot::{
    OperatorEntry, QuorumEntry, RegistrySnapshot, SnapshotDocument, SnapshotError, StrategyEntry,
};
pub use strategies::RestakeableStrategyQuery;
pub use traits::{
    BlockNumber, Collaborator, CollaboratorError, Collaborators, OperatorSetDirectory,
    RegistryCoordinator, RewardsCoordinator, StakeRegistry, TokenLedger,
};
#[cfg(any(test, feature = "test-utils"))]
pub use traits::{
    MockOperatorSetDirectory, MockRegistryCoordinator, MockRewardsCoordinator,
    MockStakeRegistry, MockTokenLedger,
};
