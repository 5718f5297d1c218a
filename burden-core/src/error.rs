//! Error types shared by every pipeline stage.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::HouseholdId;

/// Errors raised while validating configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The fiscal totals sum past the decimal range.
    #[error("fiscal totals exceed the decimal range")]
    FiscalTotalOverflow,

    /// The VAT rate must be between 0 and 1.
    #[error("VAT rate must be between 0 and 1, got {0}")]
    InvalidVatRate(Decimal),

    /// A published fiscal total must be non-negative.
    #[error("fiscal total '{name}' must be non-negative, got {value}")]
    NegativeFiscalTotal { name: &'static str, value: Decimal },

    /// Bracket lower bounds must be non-negative and strictly increasing.
    #[error("bracket lower bound {bound} at position {position} is not above the previous bound")]
    UnorderedBracket { position: usize, bound: Decimal },

    /// A bracket's marginal rate must be between 0 and 1.
    #[error("bracket rate must be between 0 and 1, got {0}")]
    InvalidBracketRate(Decimal),

    /// Credit points and the per-point value must be non-negative.
    #[error("tax credit must be non-negative, got {points} points at {value_per_point} each")]
    NegativeCredit {
        points: Decimal,
        value_per_point: Decimal,
    },

    /// The contribution cap amounts must be non-negative.
    #[error("contribution cap must be non-negative, got salary {max_salary} / tax {max_tax}")]
    NegativeCap { max_salary: Decimal, max_tax: Decimal },
}

/// Top-level error type for the burden computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BurdenError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A person row references a household that is not in the household table.
    #[error("{persons} person record(s) reference unknown household {household_id}")]
    MissingForeignKey {
        household_id: HouseholdId,
        persons: usize,
    },

    /// A loaded table lacks a column the computation needs.
    #[error("{table} table is missing required column '{column}'")]
    SchemaMismatch { table: String, column: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BurdenError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BurdenError>;
