//! TOML run configuration.
//!
//! Every key is optional; omitted keys take the 2018 defaults.
//!
//! ```toml
//! median_mode = "interpolated"
//! foreign_key_policy = "reject"
//!
//! [fiscal]
//! corporate_tax = "42900000000"
//! vat_rate = "0.1453"
//!
//! [employer_contribution]
//! schedule = [
//!     { lower_bound = "0", rate = "0.0345" },
//!     { lower_bound = "5944", rate = "0.075" },
//! ]
//! cap = { max_salary = "43370", max_tax = "3012" }
//!
//! [columns.households]
//! weight = "weight"
//!
//! [columns.persons]
//! gross_income = "i111prat"
//! ```

use std::path::{Path, PathBuf};

use burden_core::{BurdenConfig, ConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::schema::ColumnConfig;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Model parameters plus the column layout of the input tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(flatten)]
    pub burden: BurdenConfig,
    pub columns: ColumnConfig,
}

impl RunConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, RunConfigError> {
        let config: Self = toml::from_str(content)?;
        config.burden.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| RunConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded run configuration");
        Ok(config)
    }
}
