//! Reward observation and commission requests/payouts.

use steward_ledger::{StakeLedger, UnitOfWork};
use steward_types::{AccountId, Amount};

use crate::debt::{pay_debts, CommissionDebt};
use crate::event::DelegationEvent;
use crate::record::DelegationRecord;
use crate::registry;
use crate::DelegationError;

/// Where withdrawn commission went.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommissionPayout {
    /// Paid to the current operator after debts were settled.
    pub operator_amount: Amount,
    /// Paid to former operators, oldest debt first.
    pub debt_payments: Vec<CommissionDebt>,
}

/// Observe the position and re-baseline the principal.
///
/// Returns the rewards accrued since the previous observation. The position
/// only shrinks through this crate's own commission unlocks (which lower the
/// principal in step), so a smaller total means a slash and yields zero.
pub(crate) fn update_principal(
    stake: &dyn StakeLedger,
    record: &mut DelegationRecord,
) -> Result<Amount, DelegationError> {
    let balances = stake.get_balances(&record.position_id())?;
    let new_total = balances.total_active();
    let accrued = new_total.saturating_sub(record.principal_amount);
    record.principal_amount = new_total;
    Ok(accrued)
}

pub(crate) fn request_commission(
    unit: &mut dyn UnitOfWork,
    operator: &AccountId,
    delegator: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<Amount, DelegationError> {
    let mut registry = registry::load_existing(unit, delegator)?;
    let record = registry.get_mut(delegator, operator)?;

    if record.commission_rate.is_zero() {
        return Err(DelegationError::InvalidState(
            "commission rate is zero, there is no commission to request".to_string(),
        ));
    }
    if !record.is_active {
        return Err(DelegationError::InvalidState(
            "cannot request commission on an ended delegation".to_string(),
        ));
    }

    let accrued = update_principal(unit.stake(), record)?;
    let commission = record.commission_rate.commission_on(accrued);

    if !commission.is_zero() {
        unit.stake().begin_unlock(&record.owner_cap, commission)?;
        record.principal_amount = record
            .principal_amount
            .checked_sub(commission)
            .ok_or(DelegationError::Overflow)?;
        record.commission_unlocking = record
            .commission_unlocking
            .checked_add(commission)
            .ok_or(DelegationError::Overflow)?;
    }

    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %operator, accrued = %accrued, commission = %commission, "commission requested");
    events.push(DelegationEvent::CommissionRequested {
        delegator: *delegator,
        operator: *operator,
        accrued_rewards: accrued,
        commission,
    });
    Ok(commission)
}

pub(crate) fn withdraw_commission(
    unit: &mut dyn UnitOfWork,
    operator: &AccountId,
    delegator: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<CommissionPayout, DelegationError> {
    let mut registry = registry::load_existing(unit, delegator)?;
    let record = registry.get_mut(delegator, operator)?;

    if !record.is_active {
        return Err(DelegationError::InvalidState(
            "cannot withdraw commission from an ended delegation".to_string(),
        ));
    }

    let balances = unit.stake().get_balances(&record.position_id())?;
    // Only commission this crate asked to unlock is paid out; anything else
    // sitting in the inactive bucket stays for the delegator's final withdrawal.
    let withdrawable = balances.inactive.min(record.commission_unlocking);
    if balances.inactive > withdrawable {
        tracing::warn!(
            %delegator,
            %operator,
            inactive = %balances.inactive,
            attributed = %withdrawable,
            "withdrawable stake exceeds requested commission, excess left in position"
        );
    }
    if withdrawable.is_zero() {
        return Ok(CommissionPayout::default());
    }

    let funds = unit.stake().withdraw(&record.owner_cap, withdrawable)?;
    record.commission_unlocking = record.commission_unlocking - withdrawable;
    // Withdrawn funds settle debts first, so they retire the covered part first.
    record.commission_in_debt = record.commission_in_debt.saturating_sub(withdrawable);

    let settlement = pay_debts(unit.assets(), &mut record.debts, funds)?;
    let operator_amount = settlement.remaining.value();
    unit.assets().credit(operator, settlement.remaining)?;

    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %operator, withdrawn = %withdrawable, to_operator = %operator_amount, "commission withdrawn");
    push_debt_events(delegator, &settlement.payments, events);
    if !operator_amount.is_zero() {
        events.push(DelegationEvent::CommissionWithdrawn {
            delegator: *delegator,
            operator: *operator,
            amount: operator_amount,
        });
    }

    Ok(CommissionPayout {
        operator_amount,
        debt_payments: settlement.payments,
    })
}

pub(crate) fn push_debt_events(
    delegator: &AccountId,
    payments: &[CommissionDebt],
    events: &mut Vec<DelegationEvent>,
) {
    events.extend(payments.iter().map(|p| DelegationEvent::DebtPaid {
        delegator: *delegator,
        creditor: p.creditor,
        amount: p.amount,
    }));
}
