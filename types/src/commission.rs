//! Commission percentage agreed between a delegator and an operator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, TypeError};

/// Whole-number commission percentage in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommissionRate(u8);

impl CommissionRate {
    pub const MAX_PERCENT: u8 = 100;

    pub fn new(percent: u8) -> Result<Self, TypeError> {
        if percent > Self::MAX_PERCENT {
            return Err(TypeError::CommissionOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `floor(accrued * percent / 100)`, computed without intermediate overflow.
    pub fn commission_on(&self, accrued: Amount) -> Amount {
        let pct = u128::from(self.0);
        let raw = accrued.raw();
        Amount::new(raw / 100 * pct + raw % 100 * pct / 100)
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
