//! Unified error type for the ubgrab client core.

use ubgrab_client::ClientError;
use ubgrab_protocol::ProtocolError;
use ubgrab_session::{SessionError, StorageError};

/// Top-level error that wraps all crate-specific errors.
///
/// Front ends match on this single type instead of importing errors from
/// each sub-crate. `#[from]` on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum UbgrabError {
    /// Local validation failed (blank phone, negative price, ...) or a
    /// payload couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session couldn't be saved or erased.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The session store couldn't be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The backend request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The screen needs a logged-in user and there is none, or the server
    /// no longer accepts the stored token.
    #[error("not logged in")]
    NotAuthenticated,
}

impl UbgrabError {
    /// `true` when the user should be sent to the login screen.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }
}
