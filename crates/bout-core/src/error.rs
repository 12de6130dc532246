//! Error types for bout-core

use crate::EventId;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A view read a state type it never declared. This is a defect in the
    /// view, not a recoverable condition.
    #[error("view `{view}` read undeclared state `{state}`")]
    UndeclaredDependency {
        view: &'static str,
        state: &'static str,
    },

    /// A slice was written by something other than its owning view
    #[error("state `{state}` is owned by view `{owner}` and cannot be written externally")]
    ForeignWrite {
        owner: &'static str,
        state: &'static str,
    },

    /// Two views tried to own the same slice
    #[error("state `{state}` (key {key:?}) already has an owning view")]
    DuplicateOwner {
        state: &'static str,
        key: Option<String>,
    },

    /// A stored slice did not have the type its id promised
    #[error("state `{0}` holds a value of the wrong type")]
    StateTypeMismatch(&'static str),

    /// Implicit events kept producing more implicit events
    #[error("cascade rooted at {root} exceeded the depth limit of {limit}")]
    CascadeOverflow { root: EventId, limit: usize },

    /// A view handler failed for a reason of its own
    #[error("view `{view}` failed: {message}")]
    Handler { view: &'static str, message: String },

    /// The event log could not durably record an event
    #[error("persistence error: {0}")]
    Persistence(String),

    /// An earlier cascade aborted; the in-memory state must be rebuilt from the log
    #[error("bus is poisoned by an aborted cascade; rebuild from the log")]
    Poisoned,

    #[error("invalid event id: {0}")]
    InvalidEventId(String),
}

impl Error {
    /// Whether this error leaves the game's in-memory state unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UndeclaredDependency { .. }
                | Error::StateTypeMismatch(_)
                | Error::CascadeOverflow { .. }
                | Error::Handler { .. }
                | Error::Poisoned
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
