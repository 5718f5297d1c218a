//! Run configuration for the burden computation.
//!
//! Every monetary constant the model depends on lives here so a different
//! survey year only needs a different configuration, not a code change. The
//! [`Default`] impls carry the 2018 values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::MedianMode;
use crate::error::ConfigError;
use crate::models::{ContributionCap, TaxBracket, TaxBracketSchedule};

/// Published national tax totals and the VAT rate.
///
/// The four totals are annual amounts. Together with the employer
/// contributions they form the pool of indirect taxes that is allocated to
/// households by consumption share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalConfig {
    /// Corporate income tax collected in the year.
    pub corporate_tax: Decimal,

    /// Customs duties (tariffs).
    pub customs_duties: Decimal,

    /// Purchase tax on goods.
    pub purchase_tax: Decimal,

    /// Excise on fuel.
    pub fuel_excise: Decimal,

    /// VAT rate applied to the VAT-liable consumption categories.
    ///
    /// Lower than the statutory 17% because survey consumption is reported
    /// gross of VAT: 0.17 / 1.17 ≈ 0.1453.
    pub vat_rate: Decimal,
}

impl Default for FiscalConfig {
    fn default() -> Self {
        Self {
            corporate_tax: dec!(42900000000),
            customs_duties: dec!(2900000000),
            purchase_tax: dec!(19100000000),
            fuel_excise: dec!(36700000000),
            vat_rate: dec!(0.1453),
        }
    }
}

impl FiscalConfig {
    /// Sum of the published annual totals.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use burden_core::FiscalConfig;
    ///
    /// assert_eq!(FiscalConfig::default().macro_total(), Some(dec!(101600000000)));
    /// ```
    ///
    /// `None` if the sum leaves the decimal range.
    pub fn macro_total(&self) -> Option<Decimal> {
        self.corporate_tax
            .checked_add(self.customs_duties)?
            .checked_add(self.purchase_tax)?
            .checked_add(self.fuel_excise)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let totals = [
            ("corporate_tax", self.corporate_tax),
            ("customs_duties", self.customs_duties),
            ("purchase_tax", self.purchase_tax),
            ("fuel_excise", self.fuel_excise),
        ];
        if let Some((name, value)) = totals.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(ConfigError::NegativeFiscalTotal { name, value });
        }
        if self.vat_rate < Decimal::ZERO || self.vat_rate > Decimal::ONE {
            return Err(ConfigError::InvalidVatRate(self.vat_rate));
        }
        if self.macro_total().is_none() {
            return Err(ConfigError::FiscalTotalOverflow);
        }
        Ok(())
    }
}

/// Employer-side National Insurance and Health contribution rules.
///
/// Applied to each person's monthly gross income with no tax credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployerContributionConfig {
    pub schedule: TaxBracketSchedule,
    pub cap: ContributionCap,
}

impl Default for EmployerContributionConfig {
    fn default() -> Self {
        Self {
            schedule: TaxBracketSchedule::new_unchecked(vec![
                TaxBracket::new(dec!(0), dec!(0.0345)),
                TaxBracket::new(dec!(5944), dec!(0.075)),
            ]),
            cap: ContributionCap::new(dec!(43370), dec!(3012)),
        }
    }
}

impl EmployerContributionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Re-run the ordering checks for schedules built in code.
        TaxBracketSchedule::new(self.schedule.brackets().to_vec())?;
        self.cap.validate()
    }
}

/// What to do with person rows whose household is missing from the
/// household table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyPolicy {
    /// Drop their contributions and log how many were dropped.
    #[default]
    Drop,
    /// Fail the run with [`crate::BurdenError::MissingForeignKey`].
    Reject,
}

/// Everything the pipeline needs besides the two input tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurdenConfig {
    pub fiscal: FiscalConfig,
    pub employer_contribution: EmployerContributionConfig,
    pub median_mode: MedianMode,
    pub foreign_key_policy: ForeignKeyPolicy,
}

impl BurdenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fiscal.validate()?;
        self.employer_contribution.validate()
    }
}
