//! The delegation engine: public operations and views over a substrate.

use steward_ledger::{Substrate, UnitOfWork};
use steward_types::{AccountId, Amount};

use crate::accounting::{self, CommissionPayout};
use crate::debt::CommissionDebt;
use crate::event::{DelegationEvent, EventBus};
use crate::lifecycle::{self, Withdrawal};
use crate::switch;
use crate::view::{self, DelegationAmounts};
use crate::DelegationError;

/// Runs delegation operations, one unit of work each.
///
/// Caller authentication is the substrate's concern: the `delegator` and
/// `operator` arguments are taken to be already-authenticated principals
/// wherever an operation requires one.
pub struct DelegationEngine<S: Substrate> {
    substrate: S,
    events: EventBus,
}

impl<S: Substrate> DelegationEngine<S> {
    pub fn new(substrate: S) -> Self {
        Self {
            substrate,
            events: EventBus::new(),
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Register a listener for events of committed operations.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&DelegationEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Stake `amount` of the delegator's balance in a fresh position run by
    /// `operator`. Returns the position's address.
    pub fn delegate(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
        voter: &AccountId,
        amount: Amount,
        commission_percentage: u8,
    ) -> Result<AccountId, DelegationError> {
        self.atomically("delegate", |unit, events| {
            lifecycle::delegate(unit, delegator, operator, voter, amount, commission_percentage, events)
        })
    }

    /// Start unlocking the operator's commission on rewards observed since
    /// the last observation. Callable by anyone.
    pub fn request_commission(
        &self,
        operator: &AccountId,
        delegator: &AccountId,
    ) -> Result<Amount, DelegationError> {
        self.atomically("request_commission", |unit, events| {
            accounting::request_commission(unit, operator, delegator, events)
        })
    }

    /// Pay out unlocked commission, former operators first. Callable by anyone.
    pub fn withdraw_commission(
        &self,
        operator: &AccountId,
        delegator: &AccountId,
    ) -> Result<CommissionPayout, DelegationError> {
        self.atomically("withdraw_commission", |unit, events| {
            accounting::withdraw_commission(unit, operator, delegator, events)
        })
    }

    pub fn switch_operator(
        &self,
        delegator: &AccountId,
        old_operator: &AccountId,
        new_operator: &AccountId,
    ) -> Result<Amount, DelegationError> {
        self.atomically("switch_operator", |unit, events| {
            switch::switch_operator(unit, delegator, old_operator, new_operator, events)
        })
    }

    pub fn end_delegation(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<Amount, DelegationError> {
        self.atomically("end_delegation", |unit, events| {
            lifecycle::end_delegation(unit, delegator, operator, events)
        })
    }

    pub fn withdraw_delegation(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<Withdrawal, DelegationError> {
        self.atomically("withdraw_delegation", |unit, events| {
            lifecycle::withdraw_delegation(unit, delegator, operator, events)
        })
    }

    pub fn update_voter(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
        new_voter: &AccountId,
    ) -> Result<(), DelegationError> {
        self.atomically("update_voter", |unit, events| {
            lifecycle::update_voter(unit, delegator, operator, new_voter, events)
        })
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn position_address(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<AccountId, DelegationError> {
        self.inspect(|unit| view::position_address(unit, delegator, operator))
    }

    pub fn last_recorded_principal(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<Amount, DelegationError> {
        self.inspect(|unit| view::last_recorded_principal(unit, delegator, operator))
    }

    pub fn commission_percentage(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<u8, DelegationError> {
        self.inspect(|unit| view::commission_percentage(unit, delegator, operator))
    }

    pub fn is_active(&self, delegator: &AccountId, operator: &AccountId) -> Result<bool, DelegationError> {
        self.inspect(|unit| view::is_active(unit, delegator, operator))
    }

    pub fn delegation_amounts(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<DelegationAmounts, DelegationError> {
        self.inspect(|unit| view::delegation_amounts(unit, delegator, operator))
    }

    pub fn outstanding_debts(
        &self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<Vec<CommissionDebt>, DelegationError> {
        self.inspect(|unit| view::outstanding_debts(unit, delegator, operator))
    }

    pub fn operators(&self, delegator: &AccountId) -> Result<Vec<AccountId>, DelegationError> {
        self.inspect(|unit| view::operators(unit, delegator))
    }

    /// Run `op` in a fresh unit; commit and publish its events on success,
    /// discard everything on failure.
    fn atomically<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&mut dyn UnitOfWork, &mut Vec<DelegationEvent>) -> Result<T, DelegationError>,
    ) -> Result<T, DelegationError> {
        let mut unit = self.substrate.begin()?;
        let mut events = Vec::new();

        let staged: &mut dyn UnitOfWork = &mut unit;
        match op(staged, &mut events) {
            Ok(value) => {
                unit.commit()?;
                for event in &events {
                    self.events.emit(event);
                }
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(operation = name, error = %err, "operation aborted, nothing committed");
                Err(err)
            }
        }
    }

    fn inspect<T>(
        &self,
        query: impl FnOnce(&mut dyn UnitOfWork) -> Result<T, DelegationError>,
    ) -> Result<T, DelegationError> {
        // Never committed: dropping the unit discards it.
        let mut unit = self.substrate.begin()?;
        let staged: &mut dyn UnitOfWork = &mut unit;
        query(staged)
    }
}
