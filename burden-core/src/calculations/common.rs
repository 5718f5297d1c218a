//! Common helpers for weighted survey arithmetic.
//!
//! Every aggregate in the model is a sum over households scaled by the
//! household sampling weight; these helpers keep that arithmetic in one place.

use rust_decimal::Decimal;

use crate::error::{BurdenError, Result};

/// Number of months in a year. Survey amounts are monthly; published fiscal
/// totals are annual.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Sums `value × weight` over parallel iterators.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use burden_core::calculations::common::weighted_sum;
///
/// let total = weighted_sum([(dec!(100), dec!(1)), (dec!(300), dec!(3))]);
///
/// assert_eq!(total, Ok(dec!(1000)));
/// ```
///
/// # Errors
///
/// Returns [`BurdenError::InvalidInput`] if a product or the running sum
/// leaves the decimal range.
pub fn weighted_sum<I>(pairs: I) -> Result<Decimal>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    pairs
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (value, weight)| {
            value
                .checked_mul(weight)
                .and_then(|product| acc.checked_add(product))
        })
        .ok_or_else(|| overflow("weighted sum"))
}

/// Sums `values`, failing with [`BurdenError::InvalidInput`] on overflow.
pub fn checked_sum<I>(
    values: I,
    what: &str,
) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| overflow(what))
}

/// The error for an amount that leaves the decimal range.
pub(crate) fn overflow(what: &str) -> BurdenError {
    BurdenError::invalid(format!("{what} exceeds the decimal range"))
}

/// Checks that `values` and `weights` can be combined into a weighted
/// statistic: equal non-zero length, non-negative weights, positive total.
///
/// Returns the total weight.
pub fn validate_weights(
    values: &[Decimal],
    weights: &[Decimal],
) -> Result<Decimal> {
    if values.is_empty() {
        return Err(BurdenError::invalid("no values supplied"));
    }
    if values.len() != weights.len() {
        return Err(BurdenError::invalid(format!(
            "{} values but {} weights",
            values.len(),
            weights.len()
        )));
    }
    if let Some((index, weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| **w < Decimal::ZERO)
    {
        return Err(BurdenError::invalid(format!(
            "weight {weight} at position {index} is negative"
        )));
    }

    let total = checked_sum(weights.iter().copied(), "total weight")?;
    if total <= Decimal::ZERO {
        return Err(BurdenError::invalid("total weight must be positive"));
    }

    Ok(total)
}
