//! End-to-end burden computation.
//!
//! Each stage consumes the previous stage's output and produces a new value:
//!
//! ```text
//! PersonRecord[] ──► EmployerTaxByHousehold ──┐
//!                                             ├─► HouseholdAssessment ──► BurdenSummary
//! HouseholdRecord[] ──────────────────────────┘
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::checked_sum;
use crate::calculations::{
    BurdenSummary, EmployerTaxByHousehold, HouseholdAssessment, HouseholdTaxModel,
    PersonAggregator, SummaryReducer,
};
use crate::error::{BurdenError, Result};
use crate::models::{BurdenConfig, ForeignKeyPolicy, HouseholdId, HouseholdRecord, PersonRecord};

/// Intermediate and final results of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Employer contributions of persons whose household is in the table.
    pub employer_tax: EmployerTaxByHousehold,

    /// Person rows dropped because their household is not in the table.
    pub dropped_persons: usize,

    pub assessment: HouseholdAssessment,
    pub summary: BurdenSummary,
}

/// Runs the full computation under one configuration.
#[derive(Debug, Clone)]
pub struct BurdenPipeline {
    config: BurdenConfig,
}

impl BurdenPipeline {
    /// # Errors
    ///
    /// Returns [`BurdenError::Config`] if the configuration is out of range.
    pub fn new(config: BurdenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BurdenConfig {
        &self.config
    }

    /// Computes the burden ratio for one survey.
    ///
    /// # Errors
    ///
    /// - [`BurdenError::InvalidInput`] for an empty or inconsistent household
    ///   table (see [`HouseholdTaxModel::assess`]).
    /// - [`BurdenError::MissingForeignKey`] when a person references an
    ///   unknown household and the policy is [`ForeignKeyPolicy::Reject`].
    /// - [`BurdenError::InvalidInput`] when an amount leaves the decimal range.
    pub fn run(
        &self,
        households: &[HouseholdRecord],
        persons: &[PersonRecord],
    ) -> Result<PipelineReport> {
        let aggregated =
            PersonAggregator::new(&self.config.employer_contribution).aggregate(persons)?;
        let (employer_tax, dropped_persons) = self.join_households(households, aggregated)?;

        let assessment =
            HouseholdTaxModel::new(&self.config.fiscal).assess(households, &employer_tax)?;
        let summary = SummaryReducer::new(self.config.median_mode).reduce(&assessment.households)?;

        Ok(PipelineReport {
            employer_tax,
            dropped_persons,
            assessment,
            summary,
        })
    }

    /// Convenience wrapper returning only the ratio.
    pub fn ratio(
        &self,
        households: &[HouseholdRecord],
        persons: &[PersonRecord],
    ) -> Result<Decimal> {
        self.run(households, persons).map(|report| report.summary.ratio)
    }

    /// Restricts employer contributions to households in the table, applying
    /// the foreign key policy to the rest.
    fn join_households(
        &self,
        households: &[HouseholdRecord],
        aggregated: EmployerTaxByHousehold,
    ) -> Result<(EmployerTaxByHousehold, usize)> {
        let known: HashSet<HouseholdId> = households.iter().map(|h| h.household_id).collect();
        let (employer_tax, orphaned) = aggregated.split_unknown(&known);

        if let Some(first) = orphaned.first() {
            if self.config.foreign_key_policy == ForeignKeyPolicy::Reject {
                return Err(BurdenError::MissingForeignKey {
                    household_id: first.household_id,
                    persons: first.persons,
                });
            }
        }

        let dropped_persons: usize = orphaned.iter().map(|o| o.persons).sum();
        if dropped_persons > 0 {
            let dropped_tax = checked_sum(
                orphaned.iter().map(|o| o.employer_tax),
                "dropped employer tax",
            )?;
            warn!(
                households = orphaned.len(),
                persons = dropped_persons,
                employer_tax = %dropped_tax,
                "Dropping persons whose household is not in the household table"
            );
        }

        debug!(
            households = employer_tax.len(),
            "Joined employer contributions to households"
        );

        Ok((employer_tax, dropped_persons))
    }
}
