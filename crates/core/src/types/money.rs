//! Decimal money helpers.
//!
//! All amounts are [`Decimal`] in the currency's standard unit (dollars, not
//! cents). Intermediate arithmetic is exact; rounding happens once, on the
//! per-store order total.

use rust_decimal::{Decimal, RoundingStrategy};

/// Errors from money validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// A discount percentage outside `(0, 100]`.
    #[error("discount must be greater than 0 and at most 100")]
    InvalidPercentage,
    /// An amount too large to express in minor units.
    #[error("amount is out of range")]
    OutOfRange,
}

/// Round to two decimal places, half away from zero.
///
/// ```
/// use gocart_core::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(10_005, 3)), Decimal::new(1001, 2));
/// ```
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer minor units (cents) for the payment gateway.
///
/// # Errors
///
/// Returns [`MoneyError::OutOfRange`] if the amount does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    let cents = round_currency(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::OutOfRange)?;
    i64::try_from(cents).map_err(|_| MoneyError::OutOfRange)
}

/// Validate a discount percentage.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidPercentage`] unless `0 < percent <= 100`.
pub fn validate_percentage(percent: Decimal) -> Result<Decimal, MoneyError> {
    if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(MoneyError::InvalidPercentage);
    }
    Ok(percent)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(2_345, 3)), Decimal::new(235, 2));
        assert_eq!(round_currency(Decimal::new(2_344, 3)), Decimal::new(234, 2));
        assert_eq!(round_currency(Decimal::new(-2_345, 3)), Decimal::new(-235, 2));
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(2500, 2)).unwrap(), 2500);
        assert_eq!(to_minor_units(Decimal::new(19_999, 3)).unwrap(), 2000);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_to_minor_units_overflow() {
        assert_eq!(to_minor_units(Decimal::MAX), Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_validate_percentage_bounds() {
        assert!(validate_percentage(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percentage(Decimal::new(5, 1)).is_ok());
        assert_eq!(validate_percentage(Decimal::ZERO), Err(MoneyError::InvalidPercentage));
        assert_eq!(validate_percentage(Decimal::new(101, 0)), Err(MoneyError::InvalidPercentage));
        assert_eq!(validate_percentage(Decimal::NEGATIVE_ONE), Err(MoneyError::InvalidPercentage));
    }
}
