//! # Slippage Engine
//!
//! Turns an oracle estimate into the bound submitted to the ledger.
//!
//! - `ExactIn`: the counterpart is what the user receives, bounded from
//!   below: `amount * (1 - bps / 10000)`.
//! - `ExactOut`: the counterpart is what the user pays, bounded from
//!   above: `amount * (1 + bps / 10000)`.
//!
//! The authoritative side is submitted unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;
use crate::shared::types::EditSide;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Tolerance applied when slippage is in auto mode (10%)
pub const AUTO_TOLERANCE_BPS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageConfig {
    pub auto: bool,
    pub tolerance_bps: u32,
}

impl SlippageConfig {
    pub fn auto() -> Self {
        Self {
            auto: true,
            tolerance_bps: AUTO_TOLERANCE_BPS,
        }
    }

    pub fn custom(tolerance_bps: u32) -> Result<Self, SwapError> {
        if tolerance_bps > BPS_DENOMINATOR {
            return Err(SwapError::InvalidTolerance(tolerance_bps));
        }
        Ok(Self {
            auto: false,
            tolerance_bps,
        })
    }

    /// Tolerance actually applied; auto mode ignores any stored custom value
    pub fn effective_bps(&self) -> u32 {
        if self.auto {
            AUTO_TOLERANCE_BPS
        } else {
            self.tolerance_bps
        }
    }

    pub fn as_percent(&self) -> Decimal {
        Decimal::from(self.effective_bps()) / Decimal::ONE_HUNDRED
    }
}

impl Default for SlippageConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Derive the execution bound for the non-authoritative side. `None` when
/// the bound does not fit in a `Decimal`.
pub fn apply_tolerance(amount: Decimal, edit_side: EditSide, tolerance_bps: u32) -> Option<Decimal> {
    let bps = tolerance_bps.min(BPS_DENOMINATOR);
    let multiplier = match edit_side {
        EditSide::ExactIn => BPS_DENOMINATOR - bps,
        EditSide::ExactOut => BPS_DENOMINATOR + bps,
    };

    amount
        .checked_mul(Decimal::from(multiplier))?
        .checked_div(Decimal::from(BPS_DENOMINATOR))
        .map(|bound| bound.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_in_is_minimum_receive() {
        assert_eq!(apply_tolerance(dec!(100), EditSide::ExactIn, 1_000), Some(dec!(90)));
        assert_eq!(apply_tolerance(dec!(1000), EditSide::ExactIn, 500), Some(dec!(950)));
    }

    #[test]
    fn test_exact_out_is_maximum_pay() {
        assert_eq!(apply_tolerance(dec!(20), EditSide::ExactOut, 1_000), Some(dec!(22)));
        assert_eq!(apply_tolerance(dec!(1.5), EditSide::ExactOut, 200), Some(dec!(1.53)));
    }

    #[test]
    fn test_out_of_range_bound_is_none() {
        // 10^28 base units of a 0-decimal token
        let huge = crate::domain::amount::from_base_units(10u128.pow(28), 0).unwrap();
        assert_eq!(apply_tolerance(huge, EditSide::ExactOut, 1_000), None);
        assert_eq!(apply_tolerance(Decimal::MAX, EditSide::ExactIn, 1_000), None);
    }

    #[test]
    fn test_tolerance_is_monotonic() {
        let amounts = [dec!(0), dec!(0.000001), dec!(1), dec!(123.456), dec!(1000000)];
        for amount in amounts {
            for bps in [0u32, 1, 50, 1_000, 9_999, 10_000] {
                assert!(apply_tolerance(amount, EditSide::ExactIn, bps).unwrap() <= amount);
                assert!(apply_tolerance(amount, EditSide::ExactOut, bps).unwrap() >= amount);
            }
        }
    }

    #[test]
    fn test_zero_tolerance_is_identity() {
        assert_eq!(apply_tolerance(dec!(7.25), EditSide::ExactIn, 0), Some(dec!(7.25)));
        assert_eq!(apply_tolerance(dec!(7.25), EditSide::ExactOut, 0), Some(dec!(7.25)));
    }

    #[test]
    fn test_slippage_config() {
        let auto = SlippageConfig::auto();
        assert_eq!(auto.effective_bps(), 1_000);
        assert_eq!(auto.as_percent(), dec!(10));

        let custom = SlippageConfig::custom(50).unwrap();
        assert_eq!(custom.effective_bps(), 50);
        assert_eq!(custom.as_percent(), dec!(0.5));

        assert_eq!(SlippageConfig::custom(10_001), Err(SwapError::InvalidTolerance(10_001)));
    }
}
