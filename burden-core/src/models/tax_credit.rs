use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A flat credit subtracted from bracket tax: `points × value_per_point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxCreditPolicy {
    pub points: Decimal,
    pub value_per_point: Decimal,
}

impl TaxCreditPolicy {
    pub fn new(
        points: Decimal,
        value_per_point: Decimal,
    ) -> Self {
        Self {
            points,
            value_per_point,
        }
    }

    /// No credit at all. Used for employer-side contributions.
    pub fn none() -> Self {
        Self::default()
    }

    /// The 2018 resident credit: 2.25 points at 216 per point, per month.
    pub fn standard_2018() -> Self {
        Self::new(dec!(2.25), dec!(216))
    }

    /// `points × value_per_point`, saturating at [`Decimal::MAX`].
    pub fn total(&self) -> Decimal {
        self.points.saturating_mul(self.value_per_point)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points < Decimal::ZERO || self.value_per_point < Decimal::ZERO {
            return Err(ConfigError::NegativeCredit {
                points: self.points,
                value_per_point: self.value_per_point,
            });
        }
        Ok(())
    }
}

/// A statutory ceiling: at or above `max_salary` the tax is exactly `max_tax`.
///
/// The cap only takes effect when both amounts are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContributionCap {
    pub max_salary: Decimal,
    pub max_tax: Decimal,
}

impl ContributionCap {
    pub fn new(
        max_salary: Decimal,
        max_tax: Decimal,
    ) -> Self {
        Self {
            max_salary,
            max_tax,
        }
    }

    pub fn is_active(&self) -> bool {
        self.max_salary > Decimal::ZERO && self.max_tax > Decimal::ZERO
    }

    /// Returns the capped tax when `salary` reaches the ceiling.
    pub fn applies_to(
        &self,
        salary: Decimal,
    ) -> Option<Decimal> {
        (self.is_active() && salary >= self.max_salary).then_some(self.max_tax)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_salary < Decimal::ZERO || self.max_tax < Decimal::ZERO {
            return Err(ConfigError::NegativeCap {
                max_salary: self.max_salary,
                max_tax: self.max_tax,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // TaxCreditPolicy tests
    // =========================================================================

    #[test]
    fn standard_credit_totals_points_times_value() {
        let credit = TaxCreditPolicy::standard_2018();

        assert_eq!(credit.total(), dec!(486.00));
    }

    #[test]
    fn no_credit_totals_zero() {
        assert_eq!(TaxCreditPolicy::none().total(), Decimal::ZERO);
    }

    #[test]
    fn oversized_credit_saturates() {
        let credit = TaxCreditPolicy::new(Decimal::MAX, dec!(2));

        assert_eq!(credit.total(), Decimal::MAX);
    }

    #[test]
    fn validate_rejects_negative_points() {
        let credit = TaxCreditPolicy::new(dec!(-1), dec!(216));

        assert_eq!(
            credit.validate(),
            Err(ConfigError::NegativeCredit {
                points: dec!(-1),
                value_per_point: dec!(216),
            })
        );
    }

    // =========================================================================
    // ContributionCap tests
    // =========================================================================

    #[test]
    fn cap_applies_at_exact_ceiling() {
        let cap = ContributionCap::new(dec!(43370), dec!(3012));

        assert_eq!(cap.applies_to(dec!(43370)), Some(dec!(3012)));
    }

    #[test]
    fn cap_does_not_apply_below_ceiling() {
        let cap = ContributionCap::new(dec!(43370), dec!(3012));

        assert_eq!(cap.applies_to(dec!(43369.99)), None);
    }

    #[test]
    fn cap_is_inactive_when_either_amount_is_zero() {
        assert!(!ContributionCap::new(dec!(43370), dec!(0)).is_active());
        assert!(!ContributionCap::new(dec!(0), dec!(3012)).is_active());
        assert_eq!(
            ContributionCap::new(dec!(0), dec!(3012)).applies_to(dec!(1000000)),
            None
        );
    }

    #[test]
    fn validate_rejects_negative_cap() {
        let cap = ContributionCap::new(dec!(43370), dec!(-1));

        assert_eq!(
            cap.validate(),
            Err(ConfigError::NegativeCap {
                max_salary: dec!(43370),
                max_tax: dec!(-1),
            })
        );
    }
}
