//! Delegation ledger and commission-settlement engine.
//!
//! A delegator splits stake across independent operators, one stake position
//! per operator, each under its own commission rate. This crate owns:
//! - the per-delegator [`DelegationRegistry`] of [`DelegationRecord`]s,
//! - reward and commission accounting,
//! - the FIFO [`DebtQueue`] of commission owed to former operators,
//! - the operator switch protocol,
//! - the active → ended → withdrawn lifecycle.
//!
//! Every public operation on [`DelegationEngine`] runs inside one
//! [`steward_ledger::UnitOfWork`] and commits all of its effects or none.

mod accounting;
pub mod debt;
pub mod engine;
pub mod error;
pub mod event;
mod lifecycle;
pub mod record;
pub mod registry;
mod switch;
pub mod view;

pub use accounting::CommissionPayout;
pub use debt::{pay_debts, CommissionDebt, DebtQueue, Settlement};
pub use engine::DelegationEngine;
pub use error::DelegationError;
pub use event::{DelegationEvent, EventBus};
pub use lifecycle::Withdrawal;
pub use record::DelegationRecord;
pub use registry::{DelegationRegistry, POSITION_SEED_TAG};
pub use view::DelegationAmounts;
