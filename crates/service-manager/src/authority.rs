//! Caller-identity checks for the service manager's privileged operations.

use opset_primitives::{Address, Role};
use tracing::*;

use crate::errors::AuthorizationError;

/// Holds the identities allowed to invoke gated operations.
///
/// The registry coordinator is fixed at construction. The owner and rewards initiator can be
/// rotated, but only by the service manager after the owner has been authorized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGate {
    owner: Address,
    rewards_initiator: Address,
    registry_coordinator: Address,
}

impl AccessGate {
    pub fn new(owner: Address, rewards_initiator: Address, registry_coordinator: Address) -> Self {
        Self {
            owner,
            rewards_initiator,
            registry_coordinator,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn rewards_initiator(&self) -> Address {
        self.rewards_initiator
    }

    pub fn registry_coordinator(&self) -> Address {
        self.registry_coordinator
    }

    pub fn is_owner(&self, caller: Address) -> bool {
        caller == self.owner
    }

    pub fn is_rewards_initiator(&self, caller: Address) -> bool {
        caller == self.rewards_initiator
    }

    pub fn is_registry_coordinator(&self, caller: Address) -> bool {
        caller == self.registry_coordinator
    }

    /// Returns the identity currently holding `role`.
    pub fn holder(&self, role: Role) -> Address {
        match role {
            Role::Owner => self.owner,
            Role::RewardsInitiator => self.rewards_initiator,
            Role::RegistryCoordinator => self.registry_coordinator,
        }
    }

    /// Checks that `caller` holds `role`.
    ///
    /// Gated operations call this before touching any state or collaborator.
    pub fn authorize(&self, role: Role, caller: Address) -> Result<(), AuthorizationError> {
        let allowed = match role {
            Role::Owner => self.is_owner(caller),
            Role::RewardsInitiator => self.is_rewards_initiator(caller),
            Role::RegistryCoordinator => self.is_registry_coordinator(caller),
        };

        if !allowed {
            warn!(%role, %caller, "rejected unauthorized caller");
            return Err(AuthorizationError { role, caller });
        }
        Ok(())
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = owner;
    }

    pub(crate) fn set_rewards_initiator(&mut self, rewards_initiator: Address) {
        self.rewards_initiator = rewards_initiator;
    }
}
