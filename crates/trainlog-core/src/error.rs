//! Error types for trainlog-core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainlogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid set: {0}")]
    InvalidSet(String),

    #[error("No pending set at position {index} (session holds {len})")]
    PendingSetNotFound { index: usize, len: usize },

    #[error("Invalid week: {0}")]
    InvalidWeek(String),
}

pub type Result<T> = std::result::Result<T, TrainlogError>;
