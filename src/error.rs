use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Input shape error: {message}")]
    InputShape { message: String },

    #[error("Range error: {message}")]
    Range { message: String },

    #[error("Invalid year-month key: '{0}' (expected YYYY-MM)")]
    InvalidYearMonth(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn input_shape(message: impl Into<String>) -> Self {
        ProcessingError::InputShape {
            message: message.into(),
        }
    }

    pub fn range(message: impl Into<String>) -> Self {
        ProcessingError::Range {
            message: message.into(),
        }
    }

    /// Error for a key that appears more than once where the stage requires uniqueness.
    pub fn duplicate_key(stage: &str, key: impl std::fmt::Display) -> Self {
        ProcessingError::InputShape {
            message: format!("{} requires one row per key, found duplicate key {}", stage, key),
        }
    }
}
