use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CardsError {
    #[error("worker pool has been already closed")]
    PoolClosed,

    #[error("module \"{id}\" fetching failed")]
    ModuleFetchError { id: String },

    #[error("module \"{id}\" parsing failed")]
    ModuleParseError { id: String },

    #[error("operation has been cancelled")]
    Cancelled,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("module with uuid=\"{uuid}\" does not exist")]
    ModuleNotFound { uuid: Uuid },

    #[error("module is invalid: {reason}")]
    InvalidModule { reason: String },

    #[error("card #{index} is invalid: {reason}")]
    InvalidCard { index: usize, reason: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

impl CardsError {
    /// 是否為可重試的暫時性錯誤
    pub fn is_transient(&self) -> bool {
        match self {
            CardsError::ModuleFetchError { .. } => true,
            CardsError::ApiError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CardsError>;
