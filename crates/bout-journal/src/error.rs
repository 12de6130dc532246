//! Error types for bout-journal

use thiserror::Error;

/// Journal error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bout_core::Error),

    #[error(transparent)]
    Game(#[from] bout_views::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A log line could not be decoded
    #[error("corrupt log line {line}: {message}")]
    Corrupt { line: usize, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Export error
    #[error("Export error: {0}")]
    ExportError(String),
}

/// Result type for journal operations
pub type Result<T> = std::result::Result<T, Error>;
