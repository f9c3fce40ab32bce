use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::dataset::DatasetError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Column not found in dataset: '{0}'")]
    ColumnNotFound(String),

    #[error("Activity column '{column}' is not numeric")]
    ActivityNotNumeric { column: String },

    #[error("Activity column '{column}' has a non-finite value at row {row}")]
    ActivityNotFinite { column: String, row: usize },

    #[error("Activity value {value} at row {row} is outside the domain of '{scaling}' scaling")]
    ScalingDomain {
        row: usize,
        value: f64,
        scaling: String,
    },

    #[error("Sequence column '{column}' has unusable notation tagging: {reason}")]
    SequenceNotation { column: String, reason: String },

    #[error("Cluster name '{0}' already exists")]
    DuplicateCluster(String),

    #[error("Unknown cluster '{0}'")]
    UnknownCluster(String),

    #[error("Invalid settings: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Failed to serialize persisted state: {source}")]
    StateSerialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
