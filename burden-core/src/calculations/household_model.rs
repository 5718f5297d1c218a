//! Per-household tax model.
//!
//! # Model Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Employer contributions of the household's members (0 if none) |
//! | 2    | VAT: VAT-liable consumption × VAT rate |
//! | 3    | Consumption share: consumption ÷ Σ(consumption × weight) |
//! | 4    | Indirect tax pool (annual): published totals + 12 × Σ(employer tax × weight) |
//! | 5    | Allocated indirect tax (monthly): share × pool ÷ 12 |
//! | 6    | Annual total tax: (direct tax + VAT + allocated indirect tax) × 12 |
//!
//! Survey amounts are monthly, so the weighted employer contributions are
//! annualized before joining the published totals, and the allocation is
//! brought back to a monthly figure before the final annualization.
//!
//! Employer contributions enter the household's burden only through the pool.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::EmployerTaxByHousehold;
use crate::calculations::common::{MONTHS_PER_YEAR, overflow, weighted_sum};
use crate::error::{BurdenError, Result};
use crate::models::{FiscalConfig, HouseholdId, HouseholdRecord};

/// Derived tax figures for one household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdTax {
    pub household_id: HouseholdId,

    /// Sampling weight carried over from the household record.
    pub weight: Decimal,

    /// Monthly employer contributions of the household's members (Line 1).
    pub employer_tax: Decimal,

    /// Monthly VAT (Line 2).
    pub vat: Decimal,

    /// Fraction of weighted national consumption (Line 3).
    pub consumption_share: Decimal,

    /// Monthly share of the indirect tax pool (Line 5).
    pub indirect_tax: Decimal,

    /// Annual total tax (Line 6).
    pub total_tax: Decimal,
}

/// Result of running the household model over the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdAssessment {
    pub households: Vec<HouseholdTax>,

    /// Σ(consumption × weight).
    pub weighted_consumption: Decimal,

    /// Annual pool of indirect taxes allocated by consumption share (Line 4).
    pub indirect_tax_pool: Decimal,
}

/// Calculator for the household tax model.
#[derive(Debug, Clone)]
pub struct HouseholdTaxModel<'a> {
    fiscal: &'a FiscalConfig,
}

impl<'a> HouseholdTaxModel<'a> {
    pub fn new(fiscal: &'a FiscalConfig) -> Self {
        Self { fiscal }
    }

    /// Runs the model over every household.
    ///
    /// # Errors
    ///
    /// Returns [`BurdenError::InvalidInput`] if:
    /// - the household table is empty
    /// - a household identifier appears twice
    /// - a sampling weight is zero or negative
    /// - weighted consumption is zero or negative
    /// - an intermediate amount leaves the decimal range
    pub fn assess(
        &self,
        households: &[HouseholdRecord],
        employer_tax: &EmployerTaxByHousehold,
    ) -> Result<HouseholdAssessment> {
        validate_households(households)?;

        let weighted_consumption = self.weighted_consumption(households)?;
        let indirect_tax_pool = self.indirect_tax_pool(households, employer_tax)?;

        debug!(
            households = households.len(),
            weighted_consumption = %weighted_consumption,
            indirect_tax_pool = %indirect_tax_pool,
            "Assessing households"
        );

        let households = households
            .iter()
            .map(|household| -> Result<HouseholdTax> {
                let vat = self.vat(household)?;
                let consumption_share = household
                    .consumption
                    .checked_div(weighted_consumption)
                    .ok_or_else(|| overflow_in(household.household_id, "consumption share"))?;
                let indirect_tax = self
                    .allocated_indirect_tax(consumption_share, indirect_tax_pool)
                    .ok_or_else(|| overflow_in(household.household_id, "indirect tax"))?;
                let total_tax = self
                    .annual_total_tax(household.direct_tax, vat, indirect_tax)
                    .ok_or_else(|| overflow_in(household.household_id, "total tax"))?;

                Ok(HouseholdTax {
                    household_id: household.household_id,
                    weight: household.weight,
                    employer_tax: employer_tax.get(household.household_id),
                    vat,
                    consumption_share,
                    indirect_tax,
                    total_tax,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(HouseholdAssessment {
            households,
            weighted_consumption,
            indirect_tax_pool,
        })
    }

    fn vat(
        &self,
        household: &HouseholdRecord,
    ) -> Result<Decimal> {
        household
            .vat_base_total()
            .and_then(|base| base.checked_mul(self.fiscal.vat_rate))
            .ok_or_else(|| overflow_in(household.household_id, "VAT"))
    }

    fn weighted_consumption(
        &self,
        households: &[HouseholdRecord],
    ) -> Result<Decimal> {
        let total = weighted_sum(households.iter().map(|h| (h.consumption, h.weight)))?;
        if total <= Decimal::ZERO {
            return Err(BurdenError::invalid(format!(
                "weighted consumption must be positive, got {total}"
            )));
        }
        Ok(total)
    }

    fn indirect_tax_pool(
        &self,
        households: &[HouseholdRecord],
        employer_tax: &EmployerTaxByHousehold,
    ) -> Result<Decimal> {
        let weighted_employer = weighted_sum(
            households
                .iter()
                .map(|h| (employer_tax.get(h.household_id), h.weight)),
        )?;

        self.fiscal
            .macro_total()
            .zip(weighted_employer.checked_mul(MONTHS_PER_YEAR))
            .and_then(|(macro_total, employer)| macro_total.checked_add(employer))
            .ok_or_else(|| overflow("indirect tax pool"))
    }

    fn allocated_indirect_tax(
        &self,
        consumption_share: Decimal,
        pool: Decimal,
    ) -> Option<Decimal> {
        consumption_share
            .checked_mul(pool)?
            .checked_div(MONTHS_PER_YEAR)
    }

    fn annual_total_tax(
        &self,
        direct_tax: Decimal,
        vat: Decimal,
        indirect_tax: Decimal,
    ) -> Option<Decimal> {
        direct_tax
            .checked_add(vat)?
            .checked_add(indirect_tax)?
            .checked_mul(MONTHS_PER_YEAR)
    }
}

fn overflow_in(
    household_id: HouseholdId,
    what: &str,
) -> BurdenError {
    overflow(&format!("{what} of household {household_id}"))
}

fn validate_households(households: &[HouseholdRecord]) -> Result<()> {
    if households.is_empty() {
        return Err(BurdenError::invalid("household table is empty"));
    }

    let mut seen = HashSet::with_capacity(households.len());
    for household in households {
        if !seen.insert(household.household_id) {
            return Err(BurdenError::invalid(format!(
                "household {} appears more than once",
                household.household_id
            )));
        }
        if household.weight <= Decimal::ZERO {
            return Err(BurdenError::invalid(format!(
                "household {} has non-positive weight {}",
                household.household_id, household.weight
            )));
        }
    }

    Ok(())
}
