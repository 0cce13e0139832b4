use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Spreadsheet '{0}' not found. Make sure it's shared with the service account.")]
    SpreadsheetNotFound(String),

    #[error("Worksheet '{0}' not found.")]
    WorksheetNotFound(String),

    #[error("Error opening sheet: {0}")]
    Open(String),

    #[error("No data provided for {0} operation")]
    MissingData(&'static str),

    #[error("{0}")]
    InvalidJson(&'static str),

    #[error("Invalid cell reference '{0}'")]
    InvalidCell(String),

    #[error("{0}")]
    Remote(String),

    #[error("Invalid operation '{0}'. Allowed operations: read, update, append")]
    UnknownOperation(String),

    #[error("Operation mismatch: expected '{expected}', got '{got}'")]
    OperationMismatch { expected: &'static str, got: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
