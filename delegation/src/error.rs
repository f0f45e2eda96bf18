//! Delegation-specific errors.
//!
//! Every variant aborts the enclosing operation; nothing it staged is committed.

use steward_ledger::LedgerError;
use steward_store::StoreError;
use steward_types::{AccountId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelegationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("delegator {delegator} already has a delegation with operator {operator}")]
    AlreadyExists {
        delegator: AccountId,
        operator: AccountId,
    },

    #[error("delegator {0} has no delegation registry")]
    RegistryNotFound(AccountId),

    #[error("delegator {delegator} has no delegation with operator {operator}")]
    DelegationNotFound {
        delegator: AccountId,
        operator: AccountId,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("delegation with operator {0} has already ended")]
    AlreadyEnded(AccountId),

    #[error("arithmetic overflow in delegation accounting")]
    Overflow,

    #[error("registry codec error: {0}")]
    Codec(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("funds error: {0}")]
    Funds(#[from] TypeError),
}

impl DelegationError {
    /// True for both missing-registry and missing-record failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DelegationError::RegistryNotFound(_) | DelegationError::DelegationNotFound { .. }
        )
    }
}
