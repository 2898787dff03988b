//! Persistence hook for the session token.
//!
//! The session manager doesn't know where the token lives: a file in the
//! app data directory, a platform keychain, or a plain `Option` in tests.
//! It only needs something that implements [`SessionStore`].

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::StorageError;

/// The fixed key the token is stored under.
pub const TOKEN_KEY: &str = "auth_token";

/// Durable storage for exactly one secret: the session token.
///
/// # Trait bounds
///
/// - `Send + Sync` → the store is shared between the manager and its
///   background startup task.
/// - `'static` → it lives as long as the manager, so it can't borrow
///   temporary data.
///
/// # Contract
///
/// - A value written with `set` must be returned by `get` after a process
///   restart, until `clear` is called.
/// - `clear` on an empty store is **not** an error.
/// - No timeouts are imposed by the caller. If the backing storage can
///   hang, the implementation owns that policy.
///
/// # Example
///
/// ```rust
/// use std::sync::Mutex;
/// use ubgrab_session::{SessionStore, StorageError};
///
/// /// Keeps the token in memory only. Forgets it on restart!
/// struct Volatile(Mutex<Option<String>>);
///
/// impl SessionStore for Volatile {
///     async fn get(&self) -> Result<Option<String>, StorageError> {
///         Ok(self.0.lock().unwrap().clone())
///     }
///     async fn set(&self, token: &str) -> Result<(), StorageError> {
///         *self.0.lock().unwrap() = Some(token.to_string());
///         Ok(())
///     }
///     async fn clear(&self) -> Result<(), StorageError> {
///         *self.0.lock().unwrap() = None;
///         Ok(())
///     }
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the stored token, or `None` if none was ever stored or it
    /// was cleared.
    fn get(
        &self,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Durably stores `token`, replacing any previous value.
    fn set(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Erases the stored token.
    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Sharing a store behind an `Arc` keeps it a store. Tests use this to
/// hold on to a handle after giving the store to a manager.
impl<S: SessionStore> SessionStore for Arc<S> {
    fn get(
        &self,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).get()
    }

    fn set(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).set(token)
    }

    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process [`SessionStore`].
///
/// Cloning a `MemoryStore` gives another handle to the *same* slot, so two
/// managers built from clones behave like one app before and after a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`, as if a previous run
    /// had logged in.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// Peeks at the stored value without going through the trait.
    pub fn stored(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl SessionStore for MemoryStore {
    async fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    async fn set(&self, token: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.slot.lock().take();
        Ok(())
    }
}
