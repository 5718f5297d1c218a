pub mod calculations;
pub mod error;
pub mod models;
pub mod pipeline;

pub use error::{BurdenError, ConfigError};
pub use models::*;
pub use pipeline::{BurdenPipeline, PipelineReport};
