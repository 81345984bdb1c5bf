use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing statistic for feature '{feature}' ({field})")]
    MissingStatistic { feature: String, field: &'static str },

    #[error("Schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("Domain violation for '{feature}': {message}")]
    DomainViolation { feature: String, message: String },

    #[error("Statistics for station {station_id} not found")]
    StationNotFound { station_id: String },

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    pub fn missing_column(column: &str) -> Self {
        ProcessingError::SchemaMismatch {
            column: column.to_string(),
            reason: "required column is absent".to_string(),
        }
    }

    pub fn domain(feature: &str, message: impl Into<String>) -> Self {
        ProcessingError::DomainViolation {
            feature: feature.to_string(),
            message: message.into(),
        }
    }
}
