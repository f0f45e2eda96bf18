//! Contracts of the external collaborators the delegation engine drives.
//!
//! The engine never owns staked funds or balances itself. It talks to:
//! - a [`StakeLedger`] that tracks positions, lock-up transitions and rewards,
//! - an [`AssetLedger`] that holds liquid balances,
//! - a [`SubAccountDeriver`] that mints fresh, deterministic position addresses,
//!
//! all reached through one [`UnitOfWork`] per operation, handed out by a
//! [`Substrate`]. A unit either commits every effect or none.

pub mod asset;
pub mod deriver;
pub mod error;
pub mod stake;
pub mod unit;

pub use asset::AssetLedger;
pub use deriver::{HashDeriver, SubAccountDeriver};
pub use error::LedgerError;
pub use stake::{StakeBalances, StakeLedger};
pub use unit::{Substrate, UnitOfWork};
