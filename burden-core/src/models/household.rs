use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Survey household key shared by the household and person tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseholdId(pub u64);

impl fmt::Display for HouseholdId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for HouseholdId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One row of the person table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub household_id: HouseholdId,
    /// Gross monthly income.
    pub gross_income: Decimal,
}

/// One row of the household table.
///
/// All money amounts are monthly, as reported in the expenditure survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdRecord {
    pub household_id: HouseholdId,

    /// Total consumption expenditure. Drives the household's share of the
    /// pooled indirect taxes.
    pub consumption: Decimal,

    /// Consumption categories subject to VAT.
    pub vat_base: Vec<Decimal>,

    /// Direct taxes paid by the household.
    pub direct_tax: Decimal,

    /// Sampling weight. Strictly positive.
    pub weight: Decimal,
}

impl HouseholdRecord {
    /// Sum of the VAT-liable consumption categories, or `None` if it leaves
    /// the decimal range.
    pub fn vat_base_total(&self) -> Option<Decimal> {
        self.vat_base
            .iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
    }
}
