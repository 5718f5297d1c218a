//! CSV loaders for the household and person tables.
//!
//! Both loaders resolve the configured columns against the header row first,
//! so a missing column fails with [`BurdenError::SchemaMismatch`] before any
//! row is read.
//!
//! ## Cell rules
//!
//! - Identifiers are unsigned integers. `"1001"` and `"1001.0"` are both
//!   accepted.
//! - Amounts are decimals; scientific notation (`"1.5e3"`) is accepted.
//! - Empty consumption, direct-tax and income cells read as zero.
//! - Empty identifier and weight cells are errors.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use burden_core::{BurdenError, HouseholdId, HouseholdRecord, PersonRecord};
use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::debug;

use crate::schema::{
    HOUSEHOLD_TABLE, Header, HouseholdColumns, HouseholdLayout, PERSON_TABLE, PersonColumns,
    PersonLayout,
};

/// Errors that can occur when loading the survey tables.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell could not be parsed. `row` is 1-based (header = row 0).
    #[error("{table} table row {row}: invalid value '{value}' in column '{column}'")]
    InvalidCell {
        table: &'static str,
        row: usize,
        column: String,
        value: String,
    },

    /// A required cell was empty. `row` is 1-based (header = row 0).
    #[error("{table} table row {row}: missing value in column '{column}'")]
    MissingCell {
        table: &'static str,
        row: usize,
        column: String,
    },

    #[error(transparent)]
    Burden(#[from] BurdenError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

/// Location of a cell, for error messages.
struct Cell<'a> {
    table: &'static str,
    row: usize,
    column: &'a str,
}

impl<'a> Cell<'a> {
    fn new(
        table: &'static str,
        row: usize,
        column: &'a str,
    ) -> Self {
        Self { table, row, column }
    }

    fn invalid(
        &self,
        value: &str,
    ) -> LoaderError {
        LoaderError::InvalidCell {
            table: self.table,
            row: self.row,
            column: self.column.to_string(),
            value: value.to_string(),
        }
    }

    fn missing(&self) -> LoaderError {
        LoaderError::MissingCell {
            table: self.table,
            row: self.row,
            column: self.column.to_string(),
        }
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parses an amount; an empty cell is `None`.
fn optional_amount(
    record: &StringRecord,
    index: usize,
    cell: Cell<'_>,
) -> Result<Option<Decimal>, LoaderError> {
    let raw = record.get(index).unwrap_or_default();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_decimal(raw).map(Some).ok_or_else(|| cell.invalid(raw))
}

/// Parses an amount; an empty cell reads as zero.
fn amount_or_zero(
    record: &StringRecord,
    index: usize,
    cell: Cell<'_>,
) -> Result<Decimal, LoaderError> {
    Ok(optional_amount(record, index, cell)?.unwrap_or(Decimal::ZERO))
}

/// Parses an amount that must be present.
fn required_amount(
    record: &StringRecord,
    index: usize,
    cell: Cell<'_>,
) -> Result<Decimal, LoaderError> {
    let missing = cell.missing();
    optional_amount(record, index, cell)?.ok_or(missing)
}

fn household_id(
    record: &StringRecord,
    index: usize,
    cell: Cell<'_>,
) -> Result<HouseholdId, LoaderError> {
    let raw = record.get(index).unwrap_or_default();
    if raw.is_empty() {
        return Err(cell.missing());
    }
    if let Ok(id) = raw.parse::<u64>() {
        return Ok(HouseholdId(id));
    }

    parse_decimal(raw)
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u64())
        .map(HouseholdId)
        .ok_or_else(|| cell.invalid(raw))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<File, LoaderError> {
    File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loader for the household table.
pub struct HouseholdTableLoader;

impl HouseholdTableLoader {
    /// Parse household records from a CSV reader. Rows are returned in file
    /// order.
    pub fn parse<R: Read>(
        reader: R,
        columns: &HouseholdColumns,
    ) -> Result<Vec<HouseholdRecord>, LoaderError> {
        let mut csv_reader = csv_reader(reader);
        let header_record = csv_reader.headers()?.clone();
        let layout =
            HouseholdLayout::resolve(&Header::new(HOUSEHOLD_TABLE, &header_record), columns)?;

        let mut households = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = idx + 1;
            let vat_base = layout
                .vat_base
                .iter()
                .zip(&columns.vat_base)
                .map(|(&index, name)| {
                    amount_or_zero(&record, index, Cell::new(HOUSEHOLD_TABLE, row, name))
                })
                .collect::<Result<Vec<_>, _>>()?;

            households.push(HouseholdRecord {
                household_id: household_id(
                    &record,
                    layout.id,
                    Cell::new(HOUSEHOLD_TABLE, row, &columns.id),
                )?,
                consumption: amount_or_zero(
                    &record,
                    layout.consumption,
                    Cell::new(HOUSEHOLD_TABLE, row, &columns.consumption),
                )?,
                vat_base,
                direct_tax: amount_or_zero(
                    &record,
                    layout.direct_tax,
                    Cell::new(HOUSEHOLD_TABLE, row, &columns.direct_tax),
                )?,
                weight: required_amount(
                    &record,
                    layout.weight,
                    Cell::new(HOUSEHOLD_TABLE, row, &columns.weight),
                )?,
            });
        }

        debug!(rows = households.len(), "Parsed household table");
        Ok(households)
    }

    /// Read the household table from disk.
    pub fn load_from_file(
        path: &Path,
        columns: &HouseholdColumns,
    ) -> Result<Vec<HouseholdRecord>, LoaderError> {
        Self::parse(open(path)?, columns)
    }
}

/// Loader for the person table.
pub struct PersonTableLoader;

impl PersonTableLoader {
    /// Parse person records from a CSV reader. Rows are returned in file
    /// order.
    pub fn parse<R: Read>(
        reader: R,
        columns: &PersonColumns,
    ) -> Result<Vec<PersonRecord>, LoaderError> {
        let mut csv_reader = csv_reader(reader);
        let header_record = csv_reader.headers()?.clone();
        let layout = PersonLayout::resolve(&Header::new(PERSON_TABLE, &header_record), columns)?;

        let mut persons = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = idx + 1;

            persons.push(PersonRecord {
                household_id: household_id(
                    &record,
                    layout.household_id,
                    Cell::new(PERSON_TABLE, row, &columns.household_id),
                )?,
                gross_income: amount_or_zero(
                    &record,
                    layout.gross_income,
                    Cell::new(PERSON_TABLE, row, &columns.gross_income),
                )?,
            });
        }

        debug!(rows = persons.len(), "Parsed person table");
        Ok(persons)
    }

    /// Read the person table from disk.
    pub fn load_from_file(
        path: &Path,
        columns: &PersonColumns,
    ) -> Result<Vec<PersonRecord>, LoaderError> {
        Self::parse(open(path)?, columns)
    }
}
