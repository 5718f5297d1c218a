//! Calculation stages of the household tax burden model.
//!
//! Leaf calculators ([`weighted_median`], [`BracketTaxCalculator`]) are
//! combined by the stages [`PersonAggregator`], [`HouseholdTaxModel`] and
//! [`SummaryReducer`].

pub mod bracket_tax;
pub mod common;
pub mod household_model;
pub mod person_aggregator;
pub mod summary;
pub mod weighted_median;

pub use bracket_tax::BracketTaxCalculator;
pub use household_model::{HouseholdAssessment, HouseholdTax, HouseholdTaxModel};
pub use person_aggregator::{EmployerTaxByHousehold, OrphanedHousehold, PersonAggregator};
pub use summary::{BurdenSummary, SummaryReducer};
pub use weighted_median::{MedianMode, weighted_median};
