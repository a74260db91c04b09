// chain/src/types/amount.rs

//! Fixed-point currency amounts.
//!
//! All money in the ledger (block rewards, treasury balance, proposal
//! funding, transaction amounts) is counted in indivisible base units,
//! with [`DECIMALS`] fractional digits per coin. There is no floating
//! point anywhere on the accounting path, so supply arithmetic is exact
//! and reproducible across nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional decimal digits in one coin.
pub const DECIMALS: u32 = 6;

/// Base units per coin (`10^DECIMALS`).
pub const COIN: u64 = 10u64.pow(DECIMALS);

/// Basis-point denominator: a factor of `10_000` bps is `1.0`.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Currency amount in base units.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),
    #[error("amount {0:?} has more than 6 fractional digits")]
    TooPrecise(String),
    #[error("amount {0:?} overflows")]
    Overflow(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Whole coins, scaled to base units. Saturates on overflow.
    pub const fn from_coins(coins: u64) -> Self {
        Amount(coins.saturating_mul(COIN))
    }

    pub const fn base_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by a basis-point factor, rounding toward zero.
    ///
    /// The intermediate product is computed in `u128`; a result that does
    /// not fit in `u64` saturates at `u64::MAX`.
    pub fn mul_bps(self, bps: u32) -> Amount {
        let scaled = u128::from(self.0) * u128::from(bps) / u128::from(BPS_DENOMINATOR);
        Amount(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / COIN,
            self.0 % COIN,
            width = DECIMALS as usize
        )
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parses a non-negative decimal string such as `"50"` or `"0.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if frac_part.len() > DECIMALS as usize {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountParseError::Overflow(s.to_string());

        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };

        let mut frac: u64 = 0;
        for (i, b) in frac_part.bytes().enumerate() {
            let digit = u64::from(b - b'0');
            frac += digit * 10u64.pow(DECIMALS - 1 - i as u32);
        }

        whole
            .checked_mul(COIN)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(overflow)
    }
}
