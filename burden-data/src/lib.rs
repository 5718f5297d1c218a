//! Survey table loading and run configuration for the burden ratio.

pub mod config;
pub mod loader;
pub mod schema;

pub use config::{RunConfig, RunConfigError};
pub use loader::{HouseholdTableLoader, LoaderError, PersonTableLoader};
pub use schema::{ColumnConfig, HouseholdColumns, PersonColumns};
