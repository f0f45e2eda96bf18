//! Creating, ending and winding down delegations.

use steward_ledger::UnitOfWork;
use steward_types::{AccountId, Amount, CommissionRate};

use crate::accounting::push_debt_events;
use crate::debt::{pay_debts, CommissionDebt};
use crate::event::DelegationEvent;
use crate::record::DelegationRecord;
use crate::registry::{self, DelegationRegistry};
use crate::DelegationError;

/// Result of a final withdrawal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Withdrawal {
    /// Credited to the delegator after debts were settled.
    pub delegator_amount: Amount,
    /// Paid to former operators, oldest debt first.
    pub debt_payments: Vec<CommissionDebt>,
    /// Debt the withdrawn funds could not cover. Dropped with the record.
    pub unpaid_debt: Amount,
}

pub(crate) fn delegate(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
    voter: &AccountId,
    amount: Amount,
    commission_percentage: u8,
    events: &mut Vec<DelegationEvent>,
) -> Result<AccountId, DelegationError> {
    if amount.is_zero() {
        return Err(DelegationError::InvalidArgument(
            "delegation amount must be greater than zero".to_string(),
        ));
    }
    let rate = CommissionRate::new(commission_percentage)
        .map_err(|e| DelegationError::InvalidArgument(e.to_string()))?;

    let mut registry = registry::load(unit, delegator)?.unwrap_or_else(DelegationRegistry::new);
    if registry.contains(operator) {
        return Err(DelegationError::AlreadyExists {
            delegator: *delegator,
            operator: *operator,
        });
    }

    let seed = registry.next_position_seed(operator)?;
    let (signer, position) = unit.deriver().derive(delegator, &seed);

    let funds = unit.assets().debit(delegator, amount)?;
    let cap = unit.stake().create_position(signer, funds, operator, voter)?;
    registry.insert(delegator, *operator, DelegationRecord::new(amount, cap, rate))?;
    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %operator, %position, amount = %amount, commission = %rate, "delegation created");
    events.push(DelegationEvent::Delegated {
        delegator: *delegator,
        operator: *operator,
        voter: *voter,
        position,
        amount,
        commission_percentage: rate.percent(),
    });
    Ok(position)
}

/// Revoke the operator, leave the validator set and start unlocking
/// everything that is active. Returns the amount put into unlock.
pub(crate) fn end_delegation(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<Amount, DelegationError> {
    let mut registry = registry::load_existing(unit, delegator)?;
    let record = registry.get_mut(delegator, operator)?;

    if !record.is_active {
        return Err(DelegationError::AlreadyEnded(*operator));
    }

    let position = record.position_id();
    unit.stake().set_operator(&record.owner_cap, delegator)?;
    unit.stake().exit_validator_duty(&position)?;

    let balances = unit.stake().get_balances(&position)?;
    if !balances.pending_active.is_zero() {
        return Err(DelegationError::InvalidState(format!(
            "{} still pending activation, retry after the next lock-up cycle",
            balances.pending_active
        )));
    }
    if !balances.active.is_zero() {
        unit.stake().begin_unlock(&record.owner_cap, balances.active)?;
    }
    record.is_active = false;

    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %operator, %position, unlocked = %balances.active, "delegation ended");
    events.push(DelegationEvent::DelegationEnded {
        delegator: *delegator,
        operator: *operator,
        unlocked: balances.active,
    });
    Ok(balances.active)
}

pub(crate) fn withdraw_delegation(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<Withdrawal, DelegationError> {
    let mut registry = registry::load_existing(unit, delegator)?;
    let record = registry.get_mut(delegator, operator)?;

    if record.is_active {
        return Err(DelegationError::InvalidState(
            "delegation must be ended before it can be withdrawn".to_string(),
        ));
    }

    let balances = unit.stake().get_balances(&record.position_id())?;
    if !balances.pending_inactive.is_zero() {
        return Err(DelegationError::InvalidState(format!(
            "{} still unlocking, retry after the next lock-up cycle",
            balances.pending_inactive
        )));
    }

    let mut record = registry.remove(delegator, operator)?;
    let funds = unit.stake().withdraw(&record.owner_cap, balances.inactive)?;
    let settlement = pay_debts(unit.assets(), &mut record.debts, funds)?;
    let delegator_amount = settlement.remaining.value();
    unit.assets().credit(delegator, settlement.remaining)?;

    let unpaid_debt = record.debts.total();
    if !unpaid_debt.is_zero() {
        tracing::warn!(%delegator, %operator, unpaid = %unpaid_debt, "position wound down with commission debt outstanding");
    }
    unit.stake().destroy_capability(record.owner_cap)?;
    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %operator, amount = %delegator_amount, "delegation withdrawn");
    push_debt_events(delegator, &settlement.payments, events);
    events.push(DelegationEvent::DelegationWithdrawn {
        delegator: *delegator,
        operator: *operator,
        amount: delegator_amount,
        unpaid_debt,
    });

    Ok(Withdrawal {
        delegator_amount,
        debt_payments: settlement.payments,
        unpaid_debt,
    })
}

pub(crate) fn update_voter(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
    new_voter: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<(), DelegationError> {
    let registry = registry::load_existing(unit, delegator)?;
    let record = registry.get(operator).ok_or(DelegationError::DelegationNotFound {
        delegator: *delegator,
        operator: *operator,
    })?;

    unit.stake().set_voter(&record.owner_cap, new_voter)?;

    tracing::info!(%delegator, %operator, voter = %new_voter, "voter updated");
    events.push(DelegationEvent::VoterUpdated {
        delegator: *delegator,
        operator: *operator,
        voter: *new_voter,
    });
    Ok(())
}
