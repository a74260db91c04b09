//! Base block reward schedule.
//!
//! The reward starts at `initial_reward` and is multiplied by 2/3 every
//! `halving_interval` blocks ("twothirding"). The value is computed with
//! exact integer arithmetic: `floor(initial * 2^k / 3^k)` in base units,
//! where `k = height / halving_interval`, for every `u64` initial reward.

use crate::types::Amount;

/// Numerator of the per-interval reduction ratio.
pub const REDUCTION_NUMERATOR: u128 = 2;
/// Denominator of the per-interval reduction ratio.
pub const REDUCTION_DENOMINATOR: u128 = 3;

/// Largest power of three used as a single divisor: `3^80 < 2^127`, so
/// doubling a remainder below it never overflows `u128`.
const MAX_DIVISOR_EXP: u32 = 80;

/// First era whose reward is zero for every `u64` initial reward:
/// `(3/2)^110 > 2^64`.
pub const ZERO_REWARD_ERA: u64 = 110;

/// Pure function of height; holds only its two parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardCurve {
    initial_reward: Amount,
    halving_interval: u64,
}

impl RewardCurve {
    /// `halving_interval` must be non-zero; `ChainConfig::validate`
    /// enforces this for configured curves. A zero interval is treated as
    /// one.
    pub fn new(initial_reward: Amount, halving_interval: u64) -> Self {
        Self {
            initial_reward,
            halving_interval: halving_interval.max(1),
        }
    }

    pub fn initial_reward(&self) -> Amount {
        self.initial_reward
    }

    pub fn halving_interval(&self) -> u64 {
        self.halving_interval
    }

    /// Number of reductions applied at `height`.
    pub fn era(&self, height: u64) -> u64 {
        height / self.halving_interval
    }

    /// Base reward for a block at `height`.
    ///
    /// `initial * 2^k` is built up one doubling at a time as a quotient and
    /// remainder modulo `3^min(k, 80)`; any remaining factors of three are
    /// divided out at the end. Nested floor division by integers equals a
    /// single floor, so the result is exact for every era. From
    /// [`ZERO_REWARD_ERA`] on the exact value is below one base unit.
    pub fn base_reward(&self, height: u64) -> Amount {
        let era = self.era(height);
        if era >= ZERO_REWARD_ERA {
            return Amount::ZERO;
        }
        let k = era as u32;
        let direct = k.min(MAX_DIVISOR_EXP);
        let divisor = REDUCTION_DENOMINATOR.pow(direct);

        let initial = u128::from(self.initial_reward.base_units());
        let (mut quotient, mut remainder) = (initial / divisor, initial % divisor);
        for _ in 0..k {
            quotient *= REDUCTION_NUMERATOR;
            remainder *= REDUCTION_NUMERATOR;
            if remainder >= divisor {
                remainder -= divisor;
                quotient += 1;
            }
        }

        let reward = quotient / REDUCTION_DENOMINATOR.pow(k - direct);
        Amount(u64::try_from(reward).unwrap_or(u64::MAX))
    }
}
