//! Treasury balance.

use serde::Serialize;

use super::error::GovernanceError;
use crate::types::Amount;

/// Single mutable balance, debited only by executed proposals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Treasury {
    balance: Amount,
}

impl Treasury {
    pub fn new(balance: Amount) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn can_cover(&self, amount: Amount) -> bool {
        amount <= self.balance
    }

    /// Debits `amount`; leaves the balance untouched on failure.
    pub fn debit(&mut self, amount: Amount) -> Result<Amount, GovernanceError> {
        let remaining =
            self.balance
                .checked_sub(amount)
                .ok_or(GovernanceError::InsufficientTreasury {
                    requested: amount,
                    available: self.balance,
                })?;
        self.balance = remaining;
        Ok(remaining)
    }

    pub fn credit(&mut self, amount: Amount) -> Result<Amount, GovernanceError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(GovernanceError::TreasuryOverflow)?;
        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_is_all_or_nothing() {
        let mut t = Treasury::new(Amount(100));
        assert_eq!(t.debit(Amount(40)), Ok(Amount(60)));

        let err = t.debit(Amount(61)).unwrap_err();
        assert_eq!(err.code(), "insufficient_treasury");
        assert_eq!(t.balance(), Amount(60));
    }

    #[test]
    fn credit_detects_overflow() {
        let mut t = Treasury::new(Amount(u64::MAX));
        assert_eq!(t.credit(Amount(1)), Err(GovernanceError::TreasuryOverflow));
        assert_eq!(t.balance(), Amount(u64::MAX));
    }
}
