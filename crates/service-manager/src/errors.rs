use opset_primitives::{Address, Role, U256};
use thiserror::Error;

use crate::traits::CollaboratorError;

/// Top-level error type for the service manager, composed of smaller error categories.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ServiceManagerError {
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    InsufficientResource(#[from] InsufficientResourceError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The owner finalized the migration; no further migration calls are accepted.
    #[error("operator-set migration has been finalized")]
    MigrationFinalized,
}

/// The caller does not hold the role a gated operation requires.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("caller {caller} is not the {role}")]
pub struct AuthorizationError {
    pub role: Role,
    pub caller: Address,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MalformedInputError {
    /// A batch operation was invoked with nothing in it.
    #[error("batch must contain at least one submission")]
    EmptyBatch,

    /// The operator list and its assignment list differ in length.
    #[error("{operators} operators given with {operator_set_ids} operator-set assignments")]
    LengthMismatch {
        operators: usize,
        operator_set_ids: usize,
    },

    /// A submission would take zero tokens into custody.
    #[error("submission {index} has a zero amount")]
    ZeroAmount { index: usize },

    /// The operator rewards of a submission do not fit in a 256-bit amount.
    #[error("operator rewards of submission {index} overflow")]
    AmountOverflow { index: usize },

    /// An authority rotation targeted the zero address.
    #[error("new {0} must not be the zero address")]
    ZeroAddress(Role),
}

/// The caller cannot cover a rewards batch.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InsufficientResourceError {
    #[error("balance of token {token} is {available}, batch requires {required}")]
    Balance {
        token: Address,
        available: U256,
        required: U256,
    },

    #[error("allowance of token {token} is {available}, batch requires {required}")]
    Allowance {
        token: Address,
        available: U256,
        required: U256,
    },

    /// A custody transfer was refused by the token ledger.
    #[error("transfer of {amount} token {token} into custody failed: {reason}")]
    Transfer {
        token: Address,
        amount: U256,
        reason: String,
    },

    /// Raising the rewards coordinator's allowance was refused by the token ledger.
    #[error("approval of {amount} token {token} failed: {reason}")]
    Approval {
        token: Address,
        amount: U256,
        reason: String,
    },

    /// The raised allowance does not fit in a 256-bit amount.
    #[error("allowance of token {token} would overflow")]
    AllowanceOverflow { token: Address },
}
