//! Error types for sql-stringify.

use thiserror::Error;

/// The main error type for compile operations.
///
/// Compiling fails when a wildcard is aliased or a SELECT has no table.
/// An INSERT without fields or rows fails as well. Other odd input is
/// coerced into some SQL text.
#[derive(Debug, Error)]
pub enum Error {
    /// A wildcard was used on either side of an alias.
    #[error("You have an error in your SQL syntax.")]
    Syntax,

    /// SELECT was asked for without a `from` table.
    #[error("Missing select `from` table.")]
    MissingTable,

    /// A request did not have the expected shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type alias for sql-stringify operations.
pub type Result<T> = std::result::Result<T, Error>;
