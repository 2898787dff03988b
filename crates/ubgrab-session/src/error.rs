//! Error types for the session layer.

use ubgrab_protocol::ProtocolError;

/// The persistence layer failed to read, write, or erase the token.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying file system call failed.
    #[error("session storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record exists but can't be decoded (or a new one can't
    /// be encoded).
    #[error("stored session is unreadable: {0}")]
    Codec(#[from] ProtocolError),

    /// The store can't be reached at all, e.g. no data directory exists on
    /// this platform or a test double was told to fail.
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by [`SessionManager`](crate::SessionManager) operations.
///
/// Only the async mutations can fail. Reads like `token()` are total.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The caller broke the contract, e.g. passed a blank token.
    /// Retrying the same call won't help.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store failed to save or erase the token. Retryable.
    ///
    /// For `set_token` the in-memory session is untouched. For
    /// `clear_token` it has already been cleared.
    #[error("failed to persist session: {0}")]
    Persistence(#[source] StorageError),
}

impl SessionError {
    /// `true` for failures where trying the same call again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
