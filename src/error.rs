//! binlog2sql Error Types

use thiserror::Error;

/// Result type alias for binlog2sql operations
pub type Result<T> = std::result::Result<T, Error>;

/// binlog2sql error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    // Schema errors
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    // Statement errors
    #[error("Render failed: {0}")]
    Render(String),

    #[error("Row has {actual} values, expected {expected}")]
    RowWidth { expected: usize, actual: usize },

    #[error("Unique key column {index} out of range for {columns} columns")]
    KeyColumnOutOfRange { index: usize, columns: usize },

    #[error("Cannot decode soft-delete flag `{column}` value {value} as an integer")]
    SoftDeleteFlag { column: String, value: String },

    #[error("Update row {index} has no after image")]
    UnpairedUpdateRow { index: usize },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error only affects a single statement and translation can go on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Render(_)
                | Error::RowWidth { .. }
                | Error::KeyColumnOutOfRange { .. }
                | Error::SoftDeleteFlag { .. }
                | Error::UnpairedUpdateRow { .. }
        )
    }
}
