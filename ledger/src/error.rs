use steward_types::{AccountId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("stake position {0} not found")]
    PositionNotFound(AccountId),

    #[error("stake position {0} already exists")]
    PositionExists(AccountId),

    #[error("capability for position {0} has been destroyed")]
    CapabilityDestroyed(AccountId),

    #[error("insufficient {bucket} stake: requested {requested}, available {available}")]
    InsufficientStake {
        bucket: &'static str,
        requested: u128,
        available: u128,
    },

    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in ledger accounting")]
    Overflow,

    #[error("funds error: {0}")]
    Funds(#[from] TypeError),

    #[error("storage error: {0}")]
    Storage(#[from] steward_store::StoreError),
}
