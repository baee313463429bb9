//! Amount codec - human decimal amounts <-> integer base units
//!
//! Every oracle and ledger call speaks base units; everything the user sees
//! is a human amount in the token's own decimals.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::shared::errors::SwapError;

/// Largest scale a `Decimal` can carry
pub const MAX_DECIMALS: u32 = 28;

fn check_decimals(decimals: u32) -> Result<(), SwapError> {
    if decimals > MAX_DECIMALS {
        return Err(SwapError::UnsupportedDecimals(decimals));
    }
    Ok(())
}

/// Scale a human amount by `10^decimals`. Digits beyond `decimals` are
/// truncated, never rounded up.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<u128, SwapError> {
    check_decimals(decimals)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(SwapError::InvalidAmount(format!("negative amount {}", amount)));
    }

    let truncated = amount.trunc_with_scale(decimals);
    let mantissa =
        u128::try_from(truncated.mantissa()).map_err(|_| SwapError::AmountOverflow)?;
    let factor = 10u128
        .checked_pow(decimals - truncated.scale())
        .ok_or(SwapError::AmountOverflow)?;

    mantissa.checked_mul(factor).ok_or(SwapError::AmountOverflow)
}

/// Inverse of [`to_base_units`]
pub fn from_base_units(raw: u128, decimals: u32) -> Result<Decimal, SwapError> {
    check_decimals(decimals)?;
    let mantissa = i128::try_from(raw).map_err(|_| SwapError::AmountOverflow)?;
    Decimal::try_from_i128_with_scale(mantissa, decimals)
        .map(|d| d.normalize())
        .map_err(|_| SwapError::AmountOverflow)
}

/// Parse raw oracle output. Grouping separators are stripped first;
/// empty output means the oracle had nothing to say.
pub fn parse_base_text(text: &str) -> Result<Option<u128>, SwapError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(None);
    }

    cleaned
        .parse::<u128>()
        .map(Some)
        .map_err(|_| SwapError::Oracle(format!("unparseable quote {:?}", text)))
}

fn fractional_digits(text: &str) -> u32 {
    text.trim()
        .split_once('.')
        .map(|(_, frac)| frac.len() as u32)
        .unwrap_or(0)
}

/// True when the amount carries no more fractional digits than the token allows
pub fn validate_precision(amount: &str, decimals: u32) -> bool {
    fractional_digits(amount) <= decimals
}

/// Parse a user-typed amount for a token with `decimals` decimals
pub fn parse_amount(text: &str, decimals: u32) -> Result<Decimal, SwapError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let digits = fractional_digits(trimmed);
    if digits > decimals {
        return Err(SwapError::PrecisionViolation {
            decimals,
            fractional_digits: digits,
        });
    }

    let normalized = if trimmed.starts_with('.') {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let amount = Decimal::from_str(&normalized)
        .map_err(|_| SwapError::InvalidAmount(trimmed.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(SwapError::InvalidAmount(trimmed.to_string()));
    }

    Ok(amount)
}
