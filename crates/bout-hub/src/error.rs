//! Error types for bout-hub

use crate::GameId;
use thiserror::Error;

/// Result type for bout-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bout-hub
#[derive(Debug, Error)]
pub enum Error {
    /// A game with this id is already scheduled
    #[error("game {0} is already scheduled")]
    DuplicateGame(GameId),

    /// Game not found
    #[error("game {0} not found")]
    UnknownGame(GameId),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] bout_core::Error),
}

// Games are pumped on worker threads, so errors must cross them.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
