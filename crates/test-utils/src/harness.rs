//! A service manager wired to in-memory collaborators.

use std::sync::Arc;

use opset_primitives::Address;
use opset_service_manager::{
    AccessGate, Collaborators, RegistrySnapshot, ServiceEvent, ServiceEventSink, ServiceManager,
    SnapshotDocument,
};
use parking_lot::Mutex;

use crate::{
    directory::RecordingDirectory, registry::InMemoryRegistry,
    rewards::RecordingRewardsCoordinator, tokens::InMemoryTokenLedger,
};

pub const SERVICE: Address = Address::with_last_byte(0x5e);
pub const OWNER: Address = Address::with_last_byte(0x0a);
pub const REWARDS_INITIATOR: Address = Address::with_last_byte(0x0b);
pub const REGISTRY_COORDINATOR: Address = Address::with_last_byte(0x0c);
pub const REWARDS_COORDINATOR: Address = Address::with_last_byte(0x0d);

/// Event sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ServiceEvent>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<ServiceEvent> {
        self.events.lock().clone()
    }
}

impl ServiceEventSink for RecordingEventSink {
    fn emit(&self, event: &ServiceEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Service manager plus handles to inspect and steer each of its collaborators.
#[derive(Debug)]
pub struct TestHarness {
    pub manager: ServiceManager,
    pub directory: Arc<RecordingDirectory>,
    pub registry: Arc<InMemoryRegistry>,
    pub tokens: Arc<InMemoryTokenLedger>,
    pub rewards: Arc<RecordingRewardsCoordinator>,
    pub events: Arc<RecordingEventSink>,
}

impl TestHarness {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        let directory = Arc::new(RecordingDirectory::new());
        let registry = Arc::new(InMemoryRegistry::new(snapshot));
        let tokens = Arc::new(InMemoryTokenLedger::new(SERVICE));
        let rewards = Arc::new(RecordingRewardsCoordinator::new(REWARDS_COORDINATOR));
        let events = Arc::new(RecordingEventSink::default());

        let collaborators = Collaborators {
            directory: directory.clone(),
            rewards_coordinator: rewards.clone(),
            tokens: tokens.clone(),
            registry: registry.clone(),
            stake_registry: registry.clone(),
        };
        let gate = AccessGate::new(OWNER, REWARDS_INITIATOR, REGISTRY_COORDINATOR);
        let manager =
            ServiceManager::new(SERVICE, gate, collaborators).with_event_sink(events.clone());

        Self {
            manager,
            directory,
            registry,
            tokens,
            rewards,
            events,
        }
    }

    /// Harness over a registry with no quorums.
    pub fn empty() -> Self {
        Self::from_document(SnapshotDocument::default())
    }

    /// # Panics
    ///
    /// If the document is not a valid snapshot.
    pub fn from_document(doc: SnapshotDocument) -> Self {
        let snapshot = RegistrySnapshot::try_from(doc).expect("test snapshot must be valid");
        Self::new(snapshot)
    }
}
