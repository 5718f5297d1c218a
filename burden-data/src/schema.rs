//! Column layout of the survey tables.
//!
//! Headers are matched by exact, case-sensitive name after trimming
//! whitespace; column order does not matter and unlisted columns are ignored.
//! The defaults are the column names of the 2018 household expenditure survey
//! files.
//!
//! ### Household table
//!
//! | Field | Default column(s) | Notes |
//! |--------------|-------------------------------------------|--------------------------------|
//! | `id` | `misparmb` | unsigned integer, unique |
//! | `consumption`| `c3` | total consumption |
//! | `vat_base` | `c30,c33,c34,c35,c36,c37,c38,c39` | VAT-liable categories |
//! | `direct_tax` | `t21` | direct taxes |
//! | `weight` | `weight` | sampling weight, required |
//!
//! ### Person table
//!
//! | Field | Default column | Notes |
//! |----------------|----------------|----------------------------------|
//! | `household_id` | `misparMb` | foreign key into household table |
//! | `gross_income` | `i111prat` | gross monthly income |

use burden_core::BurdenError;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

pub const HOUSEHOLD_TABLE: &str = "household";
pub const PERSON_TABLE: &str = "person";

/// Column names of the household table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdColumns {
    pub id: String,
    pub consumption: String,
    pub vat_base: Vec<String>,
    pub direct_tax: String,
    pub weight: String,
}

impl Default for HouseholdColumns {
    fn default() -> Self {
        Self {
            id: "misparmb".to_string(),
            consumption: "c3".to_string(),
            vat_base: ["c30", "c33", "c34", "c35", "c36", "c37", "c38", "c39"]
                .into_iter()
                .map(String::from)
                .collect(),
            direct_tax: "t21".to_string(),
            weight: "weight".to_string(),
        }
    }
}

/// Column names of the person table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonColumns {
    pub household_id: String,
    pub gross_income: String,
}

impl Default for PersonColumns {
    fn default() -> Self {
        Self {
            household_id: "misparMb".to_string(),
            gross_income: "i111prat".to_string(),
        }
    }
}

/// Column names of both tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub households: HouseholdColumns,
    pub persons: PersonColumns,
}

/// A header row with name lookup for one table.
pub(crate) struct Header<'a> {
    table: &'static str,
    record: &'a StringRecord,
}

impl<'a> Header<'a> {
    pub(crate) fn new(
        table: &'static str,
        record: &'a StringRecord,
    ) -> Self {
        Self { table, record }
    }

    /// Position of `column`, or [`BurdenError::SchemaMismatch`] if absent.
    pub(crate) fn index_of(
        &self,
        column: &str,
    ) -> Result<usize, BurdenError> {
        self.record
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| BurdenError::SchemaMismatch {
                table: self.table.to_string(),
                column: column.to_string(),
            })
    }
}

/// Resolved positions of the household columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HouseholdLayout {
    pub id: usize,
    pub consumption: usize,
    pub vat_base: Vec<usize>,
    pub direct_tax: usize,
    pub weight: usize,
}

impl HouseholdLayout {
    pub(crate) fn resolve(
        header: &Header<'_>,
        columns: &HouseholdColumns,
    ) -> Result<Self, BurdenError> {
        Ok(Self {
            id: header.index_of(&columns.id)?,
            consumption: header.index_of(&columns.consumption)?,
            vat_base: columns
                .vat_base
                .iter()
                .map(|column| header.index_of(column))
                .collect::<Result<_, _>>()?,
            direct_tax: header.index_of(&columns.direct_tax)?,
            weight: header.index_of(&columns.weight)?,
        })
    }
}

/// Resolved positions of the person columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PersonLayout {
    pub household_id: usize,
    pub gross_income: usize,
}

impl PersonLayout {
    pub(crate) fn resolve(
        header: &Header<'_>,
        columns: &PersonColumns,
    ) -> Result<Self, BurdenError> {
        Ok(Self {
            household_id: header.index_of(&columns.household_id)?,
            gross_income: header.index_of(&columns.gross_income)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn header_record(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn household_layout_resolves_columns_in_any_order() {
        let record = header_record(&[
            "weight", "c39", "c38", "c37", "c36", "c35", "c34", "c33", "c30", "t21", "c3",
            "misparmb",
        ]);
        let header = Header::new(HOUSEHOLD_TABLE, &record);

        let layout = HouseholdLayout::resolve(&header, &HouseholdColumns::default())
            .expect("all columns present");

        assert_eq!(
            layout,
            HouseholdLayout {
                id: 11,
                consumption: 10,
                vat_base: vec![8, 7, 6, 5, 4, 3, 2, 1],
                direct_tax: 9,
                weight: 0,
            }
        );
    }

    #[test]
    fn household_layout_reports_missing_column() {
        let record = header_record(&["misparmb", "c3", "t21", "weight"]);
        let header = Header::new(HOUSEHOLD_TABLE, &record);

        let result = HouseholdLayout::resolve(&header, &HouseholdColumns::default());

        assert_eq!(
            result,
            Err(BurdenError::SchemaMismatch {
                table: "household".to_string(),
                column: "c30".to_string(),
            })
        );
    }

    #[test]
    fn person_layout_is_case_sensitive() {
        let record = header_record(&["misparmb", "i111prat"]);
        let header = Header::new(PERSON_TABLE, &record);

        let result = PersonLayout::resolve(&header, &PersonColumns::default());

        assert_eq!(
            result,
            Err(BurdenError::SchemaMismatch {
                table: "person".to_string(),
                column: "misparMb".to_string(),
            })
        );
    }

    #[test]
    fn person_layout_ignores_extra_columns() {
        let record = header_record(&["age", "i111prat", "sex", "misparMb"]);
        let header = Header::new(PERSON_TABLE, &record);

        let layout =
            PersonLayout::resolve(&header, &PersonColumns::default()).expect("columns present");

        assert_eq!(
            layout,
            PersonLayout {
                household_id: 3,
                gross_income: 1,
            }
        );
    }
}
