//! Reduces household totals to the median-to-aggregate burden ratio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculations::common::{overflow, weighted_sum};
use crate::calculations::{HouseholdTax, MedianMode, weighted_median};
use crate::error::{BurdenError, Result};

/// The summary statistic and the two quantities it is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurdenSummary {
    /// Weighted median of annual household total tax.
    pub median_total_tax: Decimal,

    /// Σ(total tax × weight): the tax paid by all households nationally.
    pub aggregate_total_tax: Decimal,

    /// `median_total_tax / aggregate_total_tax`, as a fraction.
    pub ratio: Decimal,

    pub households: usize,
}

impl BurdenSummary {
    /// The ratio scaled to a percentage, or `None` if that leaves the decimal
    /// range.
    pub fn as_percentage(&self) -> Option<Decimal> {
        self.ratio.checked_mul(Decimal::ONE_HUNDRED)
    }
}

/// Computes the weighted median of household totals and divides it by the
/// weighted aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryReducer {
    mode: MedianMode,
}

impl SummaryReducer {
    pub fn new(mode: MedianMode) -> Self {
        Self { mode }
    }

    /// # Errors
    ///
    /// Returns [`BurdenError::InvalidInput`] if there are no households, the
    /// weights are invalid, the aggregate tax is zero, or an amount leaves the
    /// decimal range.
    pub fn reduce(
        &self,
        households: &[HouseholdTax],
    ) -> Result<BurdenSummary> {
        let totals: Vec<Decimal> = households.iter().map(|h| h.total_tax).collect();
        let weights: Vec<Decimal> = households.iter().map(|h| h.weight).collect();

        let median_total_tax = weighted_median(&totals, &weights, self.mode)?;
        let aggregate_total_tax = weighted_sum(totals.iter().copied().zip(weights))?;

        if aggregate_total_tax.is_zero() {
            return Err(BurdenError::invalid("aggregate total tax is zero"));
        }
        let ratio = median_total_tax
            .checked_div(aggregate_total_tax)
            .ok_or_else(|| overflow("burden ratio"))?;

        info!(
            median_total_tax = %median_total_tax,
            aggregate_total_tax = %aggregate_total_tax,
            ratio = %ratio,
            "Reduced household totals"
        );

        Ok(BurdenSummary {
            median_total_tax,
            aggregate_total_tax,
            ratio,
            households: households.len(),
        })
    }
}
