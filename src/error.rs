// ❗ Error types for the prestation core
// Every failure is local to the operation that raised it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrestationError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Index {index} out of range (collection holds {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PrestationError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PrestationError::InvalidInput {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrestationError>;
