//! Errors raised while constructing or manipulating core values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("commission percentage {0} exceeds 100")]
    CommissionOutOfRange(u8),

    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("arithmetic overflow")]
    Overflow,
}
