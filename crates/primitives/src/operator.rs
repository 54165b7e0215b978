//! Operator identifiers and the operator-set assignment produced by a migration.

use alloy_primitives::{Bytes, B256, U256};
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Opaque, hash-derived identity the registry uses as an operator's primary key.
pub type OperatorId = B256;

/// Identifier of an operator set in the directory.
///
/// Migrated operator sets reuse the quorum number as their id.
pub type OperatorSetId = u32;

/// Ordered (ascending) list of operator sets one operator belongs to.
pub type OperatorSetAssignment = Vec<OperatorSetId>;

/// Proof an operator supplies when registering with the directory.
///
/// The signature covers the registration digest, salted to prevent replay and bounded by
/// `expiry`. Its contents are only checked by the directory.
#[derive(Clone, Debug, Default, Eq, PartialEq, Arbitrary, Serialize, Deserialize)]
pub struct OperatorSignature {
    pub signature: Bytes,
    pub salt: B256,
    pub expiry: U256,
}

impl OperatorSignature {
    pub fn new(signature: Bytes, salt: B256, expiry: U256) -> Self {
        Self {
            signature,
            salt,
            expiry,
        }
    }
}
