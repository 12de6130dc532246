//! Error types for bout-views

use thiserror::Error;

/// Bout domain error type
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bout_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("nothing to undo")]
    NothingToUndo,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
