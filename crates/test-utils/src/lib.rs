//! Test utilities for the operator-set service manager crates.
//!
//! In-memory collaborators record what they are asked to do and can be told to fail specific
//! calls. [`TestHarness`] wires them into a [`opset_service_manager::ServiceManager`].

mod arbitrary_generator;
mod directory;
mod failures;
mod harness;
mod registry;
mod rewards;
mod snapshot;
mod tokens;

pub use arbitrary_generator::ArbitraryGenerator;
pub use directory::{DirectoryCall, RecordingDirectory};
pub use failures::FailureInjector;
pub use harness::{
    RecordingEventSink, TestHarness, OWNER, REGISTRY_COORDINATOR, REWARDS_COORDINATOR,
    REWARDS_INITIATOR, SERVICE,
};
pub use registry::InMemoryRegistry;
pub use rewards::RecordingRewardsCoordinator;
pub use snapshot::random_snapshot_document;
pub use tokens::InMemoryTokenLedger;
