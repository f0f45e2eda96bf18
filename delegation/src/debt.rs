//! Commission owed to former operators and its FIFO settlement.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use steward_ledger::AssetLedger;
use steward_types::{AccountId, Amount, Funds};

use crate::DelegationError;

/// Unpaid commission owed to an operator that has since been switched out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionDebt {
    pub creditor: AccountId,
    pub amount: Amount,
}

/// Debts ordered oldest first. New debts join at the back; settlement always
/// starts at the front.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtQueue(VecDeque<CommissionDebt>);

impl DebtQueue {
    pub fn new() -> Self {
        Self(VecDeque::new())
    }

    /// Append a debt. Zero amounts are not recorded.
    pub fn push_back(&mut self, creditor: AccountId, amount: Amount) {
        if !amount.is_zero() {
            self.0.push_back(CommissionDebt { creditor, amount });
        }
    }

    pub fn front(&self) -> Option<&CommissionDebt> {
        self.0.front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommissionDebt> {
        self.0.iter()
    }

    /// Sum owed across every creditor.
    pub fn total(&self) -> Amount {
        self.0
            .iter()
            .fold(Amount::ZERO, |acc, d| acc.saturating_add(d.amount))
    }
}

/// Outcome of routing funds through a debt queue.
#[derive(Debug)]
pub struct Settlement {
    /// Funds left after every payable debt was paid; owed to the current beneficiary.
    pub remaining: Funds,
    /// Payments made, in the order they were made.
    pub payments: Vec<CommissionDebt>,
}

/// Pay `debts` out of `funds`, oldest debt first.
///
/// A debt the funds can cover is paid in full and discarded. A debt they
/// cannot cover receives everything that is left and stays at the head of the
/// queue with the residual amount, so it is paid first next time.
pub fn pay_debts(
    assets: &mut dyn AssetLedger,
    debts: &mut DebtQueue,
    mut funds: Funds,
) -> Result<Settlement, DelegationError> {
    let mut payments = Vec::new();

    while !funds.is_zero() {
        let Some(debt) = debts.0.pop_front() else {
            break;
        };

        if funds.value() >= debt.amount {
            let (payment, rest) = funds.split(debt.amount)?;
            assets.credit(&debt.creditor, payment)?;
            tracing::debug!(creditor = %debt.creditor, amount = %debt.amount, "commission debt cleared");
            payments.push(debt);
            funds = rest;
        } else {
            let paid = funds.value();
            let residual = debt.amount - paid;
            assets.credit(&debt.creditor, funds)?;
            tracing::debug!(creditor = %debt.creditor, paid = %paid, residual = %residual, "commission debt partially paid");
            debts.0.push_front(CommissionDebt {
                creditor: debt.creditor,
                amount: residual,
            });
            payments.push(CommissionDebt {
                creditor: debt.creditor,
                amount: paid,
            });
            funds = Funds::zero();
        }
    }

    Ok(Settlement {
        remaining: funds,
        payments,
    })
}
