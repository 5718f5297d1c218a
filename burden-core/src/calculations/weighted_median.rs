//! Weighted median estimator.
//!
//! The weighted median is the value that splits the total weight, rather than
//! the number of observations, into two equal halves. Two conventions are
//! supported:
//!
//! - [`MedianMode::Threshold`]: the first value (in ascending order) whose
//!   cumulative weight reaches half the total weight.
//! - [`MedianMode::Interpolated`]: each observation is placed at the midpoint
//!   of its weight mass, `(S_i − w_i / 2) / W`, and the value at position 0.5
//!   is read off by linear interpolation, clamped to the first and last
//!   values.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use burden_core::calculations::{MedianMode, weighted_median};
//!
//! let values = [dec!(100), dec!(300)];
//! let weights = [dec!(1), dec!(3)];
//!
//! let median = weighted_median(&values, &weights, MedianMode::Threshold).unwrap();
//!
//! assert_eq!(median, dec!(300));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{overflow, validate_weights};
use crate::error::Result;

/// How the weighted median is read from the cumulative weight distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianMode {
    /// First value whose cumulative weight is at least half the total.
    #[default]
    Threshold,
    /// Linear interpolation at the midpoint of the weight mass.
    Interpolated,
}

/// Computes the weighted median of `values` under `weights`.
///
/// Pairs are sorted by value, and equal values by weight, so the result does
/// not depend on the order of the input pairs.
///
/// # Errors
///
/// Returns [`crate::BurdenError::InvalidInput`] when the slices are empty or
/// of different lengths, when any weight is negative, when the weights sum
/// to zero, or when the weights or the interpolation leave the decimal range.
pub fn weighted_median(
    values: &[Decimal],
    weights: &[Decimal],
    mode: MedianMode,
) -> Result<Decimal> {
    let total = validate_weights(values, weights)?;

    let mut pairs: Vec<(Decimal, Decimal)> = values
        .iter()
        .copied()
        .zip(weights.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    match mode {
        MedianMode::Threshold => Ok(threshold_median(&pairs, total)),
        MedianMode::Interpolated => interpolated_median(&pairs, total),
    }
}

/// `pairs` must be sorted by value, non-empty, and weigh `total` in sum.
fn threshold_median(
    pairs: &[(Decimal, Decimal)],
    total: Decimal,
) -> Decimal {
    let threshold = total / Decimal::TWO;

    let mut cumulative = Decimal::ZERO;
    for &(value, weight) in pairs {
        cumulative += weight;
        if cumulative >= threshold {
            return value;
        }
    }

    // The final cumulative sum equals `total`, which is at least the threshold.
    pairs[pairs.len() - 1].0
}

/// `pairs` must be sorted by value, non-empty, and weigh `total` in sum.
///
/// Positions are kept in weight units, `S_i − w_i / 2`, and compared against
/// `total / 2`. This is the normalized formulation scaled by `total`, and
/// avoids rounding the positions.
fn interpolated_median(
    pairs: &[(Decimal, Decimal)],
    total: Decimal,
) -> Result<Decimal> {
    let target = total / Decimal::TWO;

    let mut cumulative = Decimal::ZERO;
    let positions: Vec<Decimal> = pairs
        .iter()
        .map(|&(_, weight)| {
            cumulative += weight;
            cumulative - weight / Decimal::TWO
        })
        .collect();

    let Some(upper) = positions.iter().position(|&x| x >= target) else {
        return Ok(pairs[pairs.len() - 1].0);
    };
    if upper == 0 || positions[upper] == target {
        return Ok(pairs[upper].0);
    }

    let lower = upper - 1;
    let (x0, x1) = (positions[lower], positions[upper]);
    let (y0, y1) = (pairs[lower].0, pairs[upper].0);

    // x0 < target < x1, so the fraction lies in (0, 1).
    let fraction = (target - x0) / (x1 - x0);
    y1.checked_sub(y0)
        .and_then(|rise| rise.checked_mul(fraction))
        .and_then(|step| y0.checked_add(step))
        .ok_or_else(|| overflow("interpolated median"))
}
