//! Move-only funds in flight between ledgers.

use crate::{Amount, TypeError};

/// A quantity of the staked asset that has left one ledger and not yet
/// landed in another.
///
/// `Funds` is neither `Clone` nor `Copy`: the only ways to get rid of a value
/// are to hand it to a ledger (`AssetLedger::credit`, `StakeLedger::create_position`),
/// to [`split`](Funds::split) it, or to [`merge`](Funds::merge) it into another.
#[must_use = "funds must be credited to an account or deposited into a position"]
#[derive(Debug, PartialEq, Eq)]
pub struct Funds {
    value: Amount,
}

impl Funds {
    /// Funds with no value; the neutral element for `merge`.
    pub fn zero() -> Self {
        Self { value: Amount::ZERO }
    }

    /// Materialise funds released by a ledger.
    ///
    /// Only ledger implementations call this, when they move value out of
    /// their own books (a withdrawal or a debit).
    pub fn issue(value: Amount) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Split off exactly `amount`, returning `(split_off, remainder)`.
    pub fn split(self, amount: Amount) -> Result<(Funds, Funds), TypeError> {
        let remainder = self
            .value
            .checked_sub(amount)
            .ok_or(TypeError::InsufficientFunds {
                needed: amount.raw(),
                available: self.value.raw(),
            })?;
        Ok((Funds { value: amount }, Funds { value: remainder }))
    }

    /// Absorb `other` into `self`.
    pub fn merge(&mut self, other: Funds) -> Result<(), TypeError> {
        self.value = self
            .value
            .checked_add(other.value)
            .ok_or(TypeError::Overflow)?;
        Ok(())
    }

    /// Consume the funds, returning their value. Ledgers call this when they
    /// book the funds into an account or position.
    pub fn into_value(self) -> Amount {
        self.value
    }
}
