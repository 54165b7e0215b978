use std::fmt;

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Roles with authority over the service manager's gated operations.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    Serialize,
    Deserialize,
)]
pub enum Role {
    /// The single owner that has exclusive ability to:
    /// 1. update the service's metadata URI
    /// 2. rotate the rewards initiator and designate the rewards claimer
    /// 3. trigger, extend and finalize the operator-set migration
    /// 4. transfer ownership
    Owner,

    /// The account allowed to create rewards submissions on behalf of the service.
    RewardsInitiator,

    /// The registry coordinator, the only caller that may forward operator registration and
    /// deregistration to the directory.
    RegistryCoordinator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::RewardsInitiator => "rewards initiator",
            Role::RegistryCoordinator => "registry coordinator",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Owner.to_string(), "owner");
        assert_eq!(Role::RewardsInitiator.to_string(), "rewards initiator");
        assert_eq!(Role::RegistryCoordinator.to_string(), "registry coordinator");
    }
}
