//! The service manager facade.
//!
//! [`ServiceManager`] owns the authority state and routes every gated call through the
//! [`AccessGate`] before delegating to the forwarder, the migrator or a collaborator. Its own
//! state is only written once every fallible step of an operation has succeeded.

use std::{fmt, sync::Arc};

use opset_config::Config;
use opset_primitives::{
    Address, OperatorDirectedRewardsSubmission, OperatorSetAssignment, OperatorSignature,
    RewardsSubmission, Role,
};
use tracing::*;

use crate::{
    authority::AccessGate,
    errors::{MalformedInputError, ServiceManagerError},
    events::{ServiceEvent, ServiceEventSink, TracingEventSink},
    migration::{MigrationPlan, OperatorSetMigrator},
    rewards::RewardsForwarder,
    strategies::RestakeableStrategyQuery,
    traits::{CollaboratorError, Collaborators, OperatorSetDirectory, RegistryCoordinator},
};

pub struct ServiceManager {
    /// Identity the service acts under.
    address: Address,
    gate: AccessGate,
    metadata_uri: Option<String>,
    migration_finalized: bool,
    collaborators: Collaborators,
    events: Arc<dyn ServiceEventSink>,
}

impl fmt::Debug for ServiceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceManager")
            .field("address", &self.address)
            .field("gate", &self.gate)
            .field("metadata_uri", &self.metadata_uri)
            .field("migration_finalized", &self.migration_finalized)
            .field("collaborators", &self.collaborators)
            .finish_non_exhaustive()
    }
}

impl ServiceManager {
    pub fn new(address: Address, gate: AccessGate, collaborators: Collaborators) -> Self {
        Self {
            address,
            gate,
            metadata_uri: None,
            migration_finalized: false,
            collaborators,
            events: Arc::new(TracingEventSink),
        }
    }

    /// Builds a manager with the identities from `config`.
    pub fn from_config(config: &Config, collaborators: Collaborators) -> Self {
        let gate = AccessGate::new(
            config.service.owner,
            config.rewards_initiator(),
            config.collaborators.registry_coordinator,
        );
        let wired = &config.collaborators;
        info!(
            service = %config.service.address,
            directory = %wired.directory,
            rewards_coordinator = %wired.rewards_coordinator,
            registry_coordinator = %wired.registry_coordinator,
            stake_registry = %wired.stake_registry,
            "building service manager"
        );
        Self::new(config.service.address, gate, collaborators)
    }

    /// Replaces the default logging event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn ServiceEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.gate.owner()
    }

    pub fn rewards_initiator(&self) -> Address {
        self.gate.rewards_initiator()
    }

    pub fn registry_coordinator(&self) -> Address {
        self.gate.registry_coordinator()
    }

    pub fn directory(&self) -> &dyn OperatorSetDirectory {
        self.collaborators.directory.as_ref()
    }

    /// Metadata URI last published through [`Self::update_metadata_uri`].
    pub fn metadata_uri(&self) -> Option<&str> {
        self.metadata_uri.as_deref()
    }

    pub fn is_migration_finalized(&self) -> bool {
        self.migration_finalized
    }

    pub fn access_gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn update_metadata_uri(
        &mut self,
        caller: Address,
        uri: impl Into<String>,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;

        let uri = uri.into();
        self.collaborators.directory.update_metadata_uri(&uri)?;

        self.metadata_uri = Some(uri.clone());
        self.events.emit(&ServiceEvent::MetadataUriUpdated { uri });
        Ok(())
    }

    pub fn create_rewards_submission(
        &mut self,
        caller: Address,
        batch: &[RewardsSubmission],
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::RewardsInitiator, caller)?;

        self.forwarder().create_rewards_submission(caller, batch)?;

        self.events
            .emit(&ServiceEvent::RewardsSubmissionsCreated { count: batch.len() });
        Ok(())
    }

    pub fn create_operator_directed_rewards_submission(
        &mut self,
        caller: Address,
        batch: &[OperatorDirectedRewardsSubmission],
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::RewardsInitiator, caller)?;

        self.forwarder()
            .create_operator_directed_rewards_submission(caller, batch)?;

        self.events
            .emit(&ServiceEvent::OperatorDirectedRewardsSubmissionsCreated { count: batch.len() });
        Ok(())
    }

    pub fn register_operator(
        &mut self,
        caller: Address,
        operator: Address,
        signature: &OperatorSignature,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::RegistryCoordinator, caller)?;

        self.collaborators
            .directory
            .register_operator(operator, signature)?;

        self.events.emit(&ServiceEvent::OperatorRegistered { operator });
        Ok(())
    }

    pub fn deregister_operator(
        &mut self,
        caller: Address,
        operator: Address,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::RegistryCoordinator, caller)?;

        self.collaborators.directory.deregister_operator(operator)?;

        self.events.emit(&ServiceEvent::OperatorDeregistered { operator });
        Ok(())
    }

    pub fn set_rewards_initiator(
        &mut self,
        caller: Address,
        new_initiator: Address,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;
        if new_initiator.is_zero() {
            return Err(MalformedInputError::ZeroAddress(Role::RewardsInitiator).into());
        }

        let previous = self.gate.rewards_initiator();
        self.gate.set_rewards_initiator(new_initiator);

        self.events.emit(&ServiceEvent::RewardsInitiatorUpdated {
            previous,
            new: new_initiator,
        });
        Ok(())
    }

    /// Designates who may claim rewards earned by the service itself.
    pub fn set_claimer_for(
        &mut self,
        caller: Address,
        claimer: Address,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;

        self.collaborators
            .rewards_coordinator
            .set_claimer_for(claimer)?;

        self.events.emit(&ServiceEvent::ClaimerSet { claimer });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;
        if new_owner.is_zero() {
            return Err(MalformedInputError::ZeroAddress(Role::Owner).into());
        }

        let previous = self.gate.owner();
        self.gate.set_owner(new_owner);

        self.events.emit(&ServiceEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }

    /// Moves the service to operator sets, recreating every quorum and its members.
    ///
    /// Can be repeated until [`Self::finalize_migration`] is called.
    pub fn migrate_and_create_operator_sets(
        &mut self,
        caller: Address,
    ) -> Result<MigrationPlan, ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;
        self.ensure_migration_open()?;

        let plan = self.migrator().migrate_and_create_operator_sets()?;

        self.events.emit(&ServiceEvent::OperatorsMigrated {
            operator_sets_created: plan.operator_set_ids_to_create.len(),
            operators: plan.operators.len(),
        });
        Ok(plan)
    }

    /// Adds `operators[i]` to the operator sets in `operator_set_ids[i]`.
    pub fn migrate_to_operator_sets(
        &mut self,
        caller: Address,
        operator_set_ids: &[OperatorSetAssignment],
        operators: &[Address],
    ) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;
        self.ensure_migration_open()?;

        self.migrator()
            .migrate_to_operator_sets(operator_set_ids, operators)?;

        self.events.emit(&ServiceEvent::OperatorsMigrated {
            operator_sets_created: 0,
            operators: operators.len(),
        });
        Ok(())
    }

    /// Closes the migration. Every later migration call fails.
    pub fn finalize_migration(&mut self, caller: Address) -> Result<(), ServiceManagerError> {
        self.gate.authorize(Role::Owner, caller)?;
        self.ensure_migration_open()?;

        self.migration_finalized = true;
        self.events.emit(&ServiceEvent::MigrationFinalized);
        Ok(())
    }

    /// Computes what [`Self::migrate_and_create_operator_sets`] would submit.
    pub fn operators_to_migrate(&self) -> Result<MigrationPlan, ServiceManagerError> {
        self.migrator().plan()
    }

    pub fn restakeable_strategies(&self) -> Result<Vec<Address>, CollaboratorError> {
        self.strategy_query().restakeable_strategies()
    }

    pub fn operator_restaked_strategies(
        &self,
        operator: Address,
    ) -> Result<Vec<Address>, CollaboratorError> {
        self.strategy_query().operator_restaked_strategies(operator)
    }

    fn ensure_migration_open(&self) -> Result<(), ServiceManagerError> {
        if self.migration_finalized {
            warn!("rejected migration call after finalization");
            return Err(ServiceManagerError::MigrationFinalized);
        }
        Ok(())
    }

    fn registry(&self) -> &dyn RegistryCoordinator {
        self.collaborators.registry.as_ref()
    }

    fn migrator(&self) -> OperatorSetMigrator<'_> {
        OperatorSetMigrator::new(self.directory(), self.registry())
    }

    fn forwarder(&self) -> RewardsForwarder<'_> {
        RewardsForwarder::new(
            self.address,
            self.collaborators.tokens.as_ref(),
            self.collaborators.rewards_coordinator.as_ref(),
        )
    }

    fn strategy_query(&self) -> RestakeableStrategyQuery<'_> {
        RestakeableStrategyQuery::new(self.registry(), self.collaborators.stake_registry.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use opset_primitives::{Bytes, B256, U256};

    use super::*;
    use crate::{
        errors::AuthorizationError,
        events::MockServiceEventSink,
        traits::{
            Collaborator, MockOperatorSetDirectory, MockRegistryCoordinator,
            MockRewardsCoordinator, MockStakeRegistry, MockTokenLedger,
        },
    };

    const SERVICE: Address = Address::with_last_byte(0x5e);
    const OWNER: Address = Address::with_last_byte(0x01);
    const INITIATOR: Address = Address::with_last_byte(0x02);
    const REGISTRY: Address = Address::with_last_byte(0x03);
    const STRANGER: Address = Address::with_last_byte(0xee);

    struct Mocks {
        directory: MockOperatorSetDirectory,
        rewards: MockRewardsCoordinator,
        registry: MockRegistryCoordinator,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                directory: MockOperatorSetDirectory::new(),
                rewards: MockRewardsCoordinator::new(),
                registry: MockRegistryCoordinator::new(),
            }
        }

        fn into_manager(self) -> ServiceManager {
            let collaborators = Collaborators {
                directory: Arc::new(self.directory),
                rewards_coordinator: Arc::new(self.rewards),
                tokens: Arc::new(MockTokenLedger::new()),
                registry: Arc::new(self.registry),
                stake_registry: Arc::new(MockStakeRegistry::new()),
            };
            ServiceManager::new(
                SERVICE,
                AccessGate::new(OWNER, INITIATOR, REGISTRY),
                collaborators,
            )
        }
    }

    fn quiet_sink() -> Arc<MockServiceEventSink> {
        let mut sink = MockServiceEventSink::new();
        sink.expect_emit().never();
        Arc::new(sink)
    }

    #[test]
    fn test_non_authorities_are_rejected_without_side_effects() {
        let mut mocks = Mocks::new();
        mocks.directory.expect_update_metadata_uri().never();
        mocks.directory.expect_register_operator().never();
        mocks.directory.expect_become_operator_set_authority().never();
        mocks.rewards.expect_set_claimer_for().never();
        let mut manager = mocks.into_manager().with_event_sink(quiet_sink());

        let unauthorized = |role| {
            ServiceManagerError::Unauthorized(AuthorizationError {
                role,
                caller: STRANGER,
            })
        };

        assert_eq!(
            manager.update_metadata_uri(STRANGER, "ipfs://x"),
            Err(unauthorized(Role::Owner))
        );
        assert_eq!(
            manager.set_rewards_initiator(STRANGER, STRANGER),
            Err(unauthorized(Role::Owner))
        );
        assert_eq!(
            manager.transfer_ownership(STRANGER, STRANGER),
            Err(unauthorized(Role::Owner))
        );
        assert_eq!(
            manager.set_claimer_for(STRANGER, STRANGER),
            Err(unauthorized(Role::Owner))
        );
        assert_eq!(
            manager
                .migrate_and_create_operator_sets(STRANGER)
                .unwrap_err(),
            unauthorized(Role::Owner)
        );
        assert_eq!(
            manager.finalize_migration(STRANGER),
            Err(unauthorized(Role::Owner))
        );
        assert_eq!(
            manager.create_rewards_submission(STRANGER, &[]),
            Err(unauthorized(Role::RewardsInitiator))
        );

        let signature = OperatorSignature::new(Bytes::new(), B256::ZERO, U256::ZERO);
        assert_eq!(
            manager.register_operator(OWNER, STRANGER, &signature),
            Err(ServiceManagerError::Unauthorized(AuthorizationError {
                role: Role::RegistryCoordinator,
                caller: OWNER,
            }))
        );

        assert_eq!(manager.owner(), OWNER);
        assert_eq!(manager.rewards_initiator(), INITIATOR);
        assert_eq!(manager.metadata_uri(), None);
        assert!(!manager.is_migration_finalized());
    }

    #[test]
    fn test_metadata_uri_is_stored_after_directory_accepts() {
        let mut mocks = Mocks::new();
        mocks
            .directory
            .expect_update_metadata_uri()
            .withf(|uri| uri == "ipfs://meta")
            .times(1)
            .returning(|_| Ok(()));

        let mut sink = MockServiceEventSink::new();
        sink.expect_emit()
            .withf(|e| {
                *e == ServiceEvent::MetadataUriUpdated {
                    uri: "ipfs://meta".to_string(),
                }
            })
            .times(1)
            .return_const(());

        let mut manager = mocks.into_manager().with_event_sink(Arc::new(sink));
        manager.update_metadata_uri(OWNER, "ipfs://meta").unwrap();
        assert_eq!(manager.metadata_uri(), Some("ipfs://meta"));
    }

    #[test]
    fn test_metadata_uri_is_kept_when_directory_fails() {
        let mut mocks = Mocks::new();
        mocks.directory.expect_update_metadata_uri().returning(|_| {
            Err(CollaboratorError::new(
                Collaborator::Directory,
                "update_metadata_uri",
                "reverted",
            ))
        });
        let mut manager = mocks.into_manager().with_event_sink(quiet_sink());

        assert!(manager.update_metadata_uri(OWNER, "ipfs://meta").is_err());
        assert_eq!(manager.metadata_uri(), None);
    }

    #[test]
    fn test_authority_rotation() {
        let mut manager = Mocks::new().into_manager();
        let new_owner = Address::with_last_byte(0x10);
        let new_initiator = Address::with_last_byte(0x20);

        manager.set_rewards_initiator(OWNER, new_initiator).unwrap();
        assert_eq!(manager.rewards_initiator(), new_initiator);

        manager.transfer_ownership(OWNER, new_owner).unwrap();
        assert_eq!(manager.owner(), new_owner);

        // The previous owner lost its authority.
        assert!(manager.set_rewards_initiator(OWNER, OWNER).is_err());
        assert_eq!(
            manager.transfer_ownership(new_owner, Address::ZERO),
            Err(ServiceManagerError::MalformedInput(
                MalformedInputError::ZeroAddress(Role::Owner)
            ))
        );
        assert_eq!(manager.owner(), new_owner);
    }

    #[test]
    fn test_deregistration_is_forwarded() {
        let operator = Address::with_last_byte(0x44);
        let mut mocks = Mocks::new();
        mocks
            .directory
            .expect_deregister_operator()
            .with(mockall::predicate::eq(operator))
            .times(1)
            .returning(|_| Ok(()));

        let mut manager = mocks.into_manager();
        manager.deregister_operator(REGISTRY, operator).unwrap();
    }

    #[test]
    fn test_finalize_closes_migration() {
        let mut mocks = Mocks::new();
        mocks.directory.expect_become_operator_set_authority().never();
        mocks.directory.expect_migrate_operators().never();
        let mut manager = mocks.into_manager();

        manager.finalize_migration(OWNER).unwrap();
        assert!(manager.is_migration_finalized());

        assert_eq!(
            manager.migrate_and_create_operator_sets(OWNER).unwrap_err(),
            ServiceManagerError::MigrationFinalized
        );
        assert_eq!(
            manager.migrate_to_operator_sets(OWNER, &[vec![0]], &[STRANGER]),
            Err(ServiceManagerError::MigrationFinalized)
        );
        assert_eq!(
            manager.finalize_migration(OWNER),
            Err(ServiceManagerError::MigrationFinalized)
        );
    }

    #[test]
    fn test_migration_with_no_quorums() {
        let mut mocks = Mocks::new();
        mocks
            .directory
            .expect_become_operator_set_authority()
            .times(1)
            .returning(|| Ok(()));
        mocks.directory.expect_create_operator_sets().never();
        mocks.registry.expect_quorum_count().returning(|| Ok(0));
        mocks.registry.expect_current_block().returning(|| Ok(1));

        let mut sink = MockServiceEventSink::new();
        sink.expect_emit()
            .withf(|e| {
                *e == ServiceEvent::OperatorsMigrated {
                    operator_sets_created: 0,
                    operators: 0,
                }
            })
            .times(1)
            .return_const(());

        let mut manager = mocks.into_manager().with_event_sink(Arc::new(sink));
        let plan = manager.migrate_and_create_operator_sets(OWNER).unwrap();
        assert!(plan.is_empty());
        assert!(manager.restakeable_strategies().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_installs_configured_identities() {
        let config = Config::from_toml_str(
            r#"
            [service]
            address = "0x000000000000000000000000000000000000005e"
            owner = "0x0000000000000000000000000000000000000001"

            [collaborators]
            directory = "0x00000000000000000000000000000000000000c3"
            rewards_coordinator = "0x00000000000000000000000000000000000000c4"
            registry_coordinator = "0x0000000000000000000000000000000000000003"
            stake_registry = "0x00000000000000000000000000000000000000c6"
            "#,
        )
        .unwrap();

        let mocks = Mocks::new();
        let collaborators = Collaborators {
            directory: Arc::new(mocks.directory),
            rewards_coordinator: Arc::new(mocks.rewards),
            tokens: Arc::new(MockTokenLedger::new()),
            registry: Arc::new(mocks.registry),
            stake_registry: Arc::new(MockStakeRegistry::new()),
        };
        let manager = ServiceManager::from_config(&config, collaborators);

        assert_eq!(manager.address(), SERVICE);
        assert_eq!(manager.owner(), OWNER);
        // No initiator configured, so the owner holds the role.
        assert_eq!(manager.rewards_initiator(), OWNER);
        assert_eq!(manager.registry_coordinator(), REGISTRY);
    }
}
