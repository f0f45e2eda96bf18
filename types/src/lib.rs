//! Fundamental types for the Steward delegation ledger.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! account identities, amounts, move-only funds, position capabilities and
//! commission rates.

pub mod account;
pub mod amount;
pub mod capability;
pub mod commission;
pub mod error;
pub mod funds;

pub use account::AccountId;
pub use amount::Amount;
pub use capability::{OwnerCapability, SubAccountSigner};
pub use commission::CommissionRate;
pub use error::TypeError;
pub use funds::Funds;
