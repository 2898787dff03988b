//! The session manager: single source of truth for the login state.
//!
//! It's responsible for:
//! - Loading the persisted token once at startup (in the background)
//! - Saving a new token *before* anyone is told about it
//! - Erasing the token on logout, even if the store misbehaves
//! - Telling every subscriber about every change
//!
//! # Concurrency note
//!
//! Reads (`token()`, `is_ready()`, ...) never wait: they look at a
//! `tokio::sync::watch` value. Mutations, the startup load included, take
//! an async *write gate* for the whole "store call + in-memory update"
//! sequence. That gives two guarantees:
//!
//! - memory and store agree whenever no mutation is in flight, and the
//!   last call to finish its store step is the one readers see;
//! - a `set_token` issued while the startup load is still reading waits
//!   for it, so the load can't overwrite a fresh login with a stale value.
//!
//! The gate never wraps user callbacks in a lock. Listener calls happen
//! after the state lock is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

use crate::listeners::{Listeners, Subscription};
use crate::{SessionError, SessionSnapshot, SessionStore};

/// Owns the session and mediates every read and write of the store.
///
/// `SessionManager` is a cheap handle: cloning it gives another handle to
/// the same state, so each screen can hold its own copy.
///
/// ## Lifecycle
///
/// ```text
/// new() ──spawns──→ initial load ──→ [ready] ──→ set_token() / clear_token()
///   │                    │                              │
///   │                    └─ store read fails → [ready, logged out]
///   ▼
/// shutdown() / last handle dropped → pending load is discarded
/// ```
pub struct SessionManager<S: SessionStore> {
    shared: Arc<Shared<S>>,
}

struct Shared<S> {
    /// Held in its own `Arc` so the startup task can use it without
    /// keeping the whole manager alive.
    store: Arc<S>,

    /// Current state. `watch` gives lock-free-looking reads and lets async
    /// consumers `await` changes.
    state: watch::Sender<SessionSnapshot>,

    /// Exact-once subscribers.
    listeners: Arc<Listeners>,

    /// Serializes mutations; see the module docs.
    writes: Arc<AsyncMutex<()>>,

    /// Set by `shutdown()`. Once set, a late startup load is ignored.
    disposed: AtomicBool,

    init_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SessionStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager in the initializing state and starts loading the
    /// persisted token in the background.
    ///
    /// Use [`ready`](Self::ready) to wait for the load to finish.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the load is spawned
    /// with `tokio::spawn`).
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initializing());
        let writes = Arc::new(AsyncMutex::new(()));

        // Take the write gate *now*, before the task is even scheduled, so
        // no mutation can slip in ahead of the startup load. A fresh mutex
        // is always free; the fallback below only exists to avoid `unwrap`.
        let gate = Arc::clone(&writes).try_lock_owned().ok();

        let shared = Arc::new(Shared {
            store: Arc::new(store),
            state,
            listeners: Arc::new(Listeners::default()),
            writes: Arc::clone(&writes),
            disposed: AtomicBool::new(false),
            init_task: Mutex::new(None),
        });

        let task = tokio::spawn(initialize(
            Arc::downgrade(&shared),
            Arc::clone(&shared.store),
            writes,
            gate,
        ));
        *shared.init_task.lock() = Some(task);

        Self { shared }
    }

    // -- Pure reads --------------------------------------------------------

    /// The current bearer token, if any. Never blocks, never fails.
    pub fn token(&self) -> Option<String> {
        self.shared.state.borrow().token.clone()
    }

    /// `true` if a non-empty token is present.
    ///
    /// Before [`is_ready`](Self::is_ready) this is always `false`, which
    /// means "unknown", not "logged out".
    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    /// `true` once the startup load has finished.
    pub fn is_ready(&self) -> bool {
        self.shared.state.borrow().is_ready
    }

    /// Both fields, read together.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.borrow().clone()
    }

    // -- Waiting -----------------------------------------------------------

    /// Waits until the startup load has finished and returns the state at
    /// that point.
    ///
    /// Returns immediately if the manager is already ready or was shut
    /// down (in which case `is_ready` may be `false`).
    pub async fn ready(&self) -> SessionSnapshot {
        let mut rx = self.shared.state.subscribe();
        let disposed = &self.shared.disposed;
        let loaded = rx
            .wait_for(|s| s.is_ready || disposed.load(Ordering::Acquire))
            .await
            .map(|snapshot| (*snapshot).clone());
        // `Err` means the sender is gone, and `self` keeps it alive.
        loaded.unwrap_or_else(|_| self.snapshot())
    }

    /// A coalescing async view of the session.
    ///
    /// Unlike [`subscribe`](Self::subscribe), a slow receiver only sees
    /// the latest state, not every intermediate one.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.state.subscribe()
    }

    // -- Mutations ---------------------------------------------------------

    /// Logs in: persists `token`, then publishes it.
    ///
    /// # Errors
    /// - [`SessionError::InvalidArgument`]: `token` is empty or whitespace.
    ///   Nothing is written.
    /// - [`SessionError::Persistence`]: the store refused the write. The
    ///   in-memory session is exactly what it was before the call, so the
    ///   UI never shows a login that a restart would silently undo.
    pub async fn set_token(
        &self,
        token: impl Into<String>,
    ) -> Result<(), SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "token must not be blank".into(),
            ));
        }

        let _gate = self.shared.writes.lock().await;

        self.shared
            .store
            .set(&token)
            .await
            .map_err(SessionError::Persistence)?;

        self.shared.publish(|state| {
            if state.token.as_deref() == Some(token.as_str()) {
                return false;
            }
            state.token = Some(token);
            true
        });

        tracing::info!("session token stored");
        Ok(())
    }

    /// Logs out: erases the stored token, then clears it in memory.
    ///
    /// The in-memory token is cleared **even if the erase fails**; a
    /// user who pressed "log out" must not keep looking logged in. The
    /// store error is still returned so the caller can retry the erase.
    ///
    /// Calling this while already logged out is fine: no error, no
    /// notification.
    ///
    /// # Errors
    /// [`SessionError::Persistence`]: the store couldn't erase the token.
    pub async fn clear_token(&self) -> Result<(), SessionError> {
        let _gate = self.shared.writes.lock().await;
        self.erase_under_gate().await
    }

    /// Logs out only if the current token is still `expected`.
    ///
    /// For callers that learned a token is dead from a request sent with
    /// it. If the user logged in again while that request was in flight,
    /// the newer session is kept. Returns `true` when the token was
    /// cleared.
    ///
    /// # Errors
    /// Same as [`clear_token`](Self::clear_token).
    pub async fn clear_token_if(
        &self,
        expected: &str,
    ) -> Result<bool, SessionError> {
        let _gate = self.shared.writes.lock().await;
        if self.token().as_deref() != Some(expected) {
            tracing::debug!("rejected token is no longer current, keeping session");
            return Ok(false);
        }
        self.erase_under_gate().await.map(|()| true)
    }

    /// Caller holds the write gate.
    async fn erase_under_gate(&self) -> Result<(), SessionError> {
        let erased = self.shared.store.clear().await;
        self.shared.publish(|state| state.token.take().is_some());

        match erased {
            Ok(()) => {
                tracing::info!("session cleared");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "session cleared in memory but the stored token could not be erased");
                Err(SessionError::Persistence(error))
            }
        }
    }

    // -- Subscriptions -----------------------------------------------------

    /// Registers `listener` to be called with the new snapshot on every
    /// change of `token` or `is_ready`.
    ///
    /// - Each change is delivered exactly once to each subscriber.
    /// - There is no ordering between subscribers.
    /// - The listener is **not** called with the current state on
    ///   registration; read [`snapshot`](Self::snapshot) for that.
    /// - The listener runs inline on the task that made the change, so it
    ///   should be quick.
    ///
    /// After [`shutdown`](Self::shutdown) this returns an inactive handle.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        if self.shared.disposed.load(Ordering::Acquire) {
            return Subscription::inert();
        }
        self.shared.listeners.register(listener)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.shared.listeners.len()
    }

    // -- Teardown ----------------------------------------------------------

    /// Tears the manager down: a still-pending startup load is cancelled
    /// and its result discarded, and all listeners are dropped.
    ///
    /// Reads keep working and return the last published state.
    pub fn shutdown(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.shared.init_task.lock().take() {
            task.abort();
        }
        self.shared.listeners.clear();
        // Wake anyone parked in `ready()` so they re-check `disposed`.
        self.shared.state.send_modify(|_| {});
        tracing::debug!("session manager shut down");
    }

    /// `true` after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }
}

impl<S> Shared<S> {
    /// Applies `update` to the state. If it reports a change, every
    /// listener is told about the new snapshot.
    fn publish(&self, update: impl FnOnce(&mut SessionSnapshot) -> bool) {
        let mut changed = None;
        self.state.send_if_modified(|state| {
            let modified = update(state);
            if modified {
                changed = Some(state.clone());
            }
            modified
        });
        if let Some(snapshot) = changed {
            self.listeners.notify(&snapshot);
        }
    }
}

impl<S> Drop for Shared<S> {
    fn drop(&mut self) {
        if let Some(task) = self.init_task.get_mut().take() {
            task.abort();
        }
    }
}

/// The startup load. Runs once per manager, in its own task.
///
/// Holds only a `Weak` to the manager: if every handle is dropped while
/// the store is still answering, the upgrade fails and the result goes
/// nowhere.
async fn initialize<S: SessionStore>(
    shared: Weak<Shared<S>>,
    store: Arc<S>,
    writes: Arc<AsyncMutex<()>>,
    gate: Option<OwnedMutexGuard<()>>,
) {
    let _gate = match gate {
        Some(gate) => gate,
        None => writes.lock_owned().await,
    };

    let token = match store.get().await {
        Ok(token) => token.filter(|t| !t.trim().is_empty()),
        Err(error) => {
            // Fail open: a broken store means "logged out", never a
            // startup that hangs or errors.
            tracing::warn!(%error, "could not read stored session, starting logged out");
            None
        }
    };

    let Some(shared) = shared.upgrade() else {
        tracing::debug!("session manager dropped before the initial load finished");
        return;
    };
    if shared.disposed.load(Ordering::Acquire) {
        tracing::debug!("session manager shut down before the initial load finished");
        return;
    }

    let authenticated = token.is_some();
    shared.publish(|state| {
        state.token = token;
        state.is_ready = true;
        true
    });
    tracing::info!(authenticated, "session ready");
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming: `test_{function}_{scenario}_{expected}`.
    //!
    //! Store failures and slow stores are simulated with `ScriptedStore`,
    //! which wraps a `MemoryStore` and can be told to fail or to hold
    //! `get()` until a test releases it.

    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Notify;

    use super::*;
    use crate::{MemoryStore, StorageError};

    // -- Helpers ----------------------------------------------------------

    #[derive(Default)]
    struct ScriptedStore {
        inner: MemoryStore,
        fail_get: AtomicBool,
        fail_set: AtomicBool,
        fail_clear: AtomicBool,
        hold_get: AtomicBool,
        release_get: Notify,
        sets: AtomicUsize,
    }

    impl ScriptedStore {
        fn holding_get() -> Self {
            let store = Self::default();
            store.hold_get.store(true, Ordering::SeqCst);
            store
        }
    }

    fn unavailable() -> StorageError {
        StorageError::Unavailable("scripted failure".into())
    }

    impl SessionStore for ScriptedStore {
        async fn get(&self) -> Result<Option<String>, StorageError> {
            if self.hold_get.load(Ordering::SeqCst) {
                self.release_get.notified().await;
            }
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.get().await
        }

        async fn set(&self, token: &str) -> Result<(), StorageError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            if self.fail_set.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.set(token).await
        }

        async fn clear(&self) -> Result<(), StorageError> {
            if self.fail_clear.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.clear().await
        }
    }

    async fn ready_manager(store: MemoryStore) -> SessionManager<MemoryStore> {
        let mgr = SessionManager::new(store);
        mgr.ready().await;
        mgr
    }

    // =====================================================================
    // initialize / ready()
    // =====================================================================

    #[tokio::test]
    async fn test_new_before_load_is_not_ready() {
        let store = Arc::new(ScriptedStore::holding_get());
        let mgr = SessionManager::new(Arc::clone(&store));

        tokio::task::yield_now().await;

        assert!(!mgr.is_ready());
        assert!(!mgr.is_authenticated());
        assert_eq!(mgr.token(), None);

        store.release_get.notify_one();
        let snapshot = mgr.ready().await;
        assert!(snapshot.is_ready);
        assert!(mgr.is_ready());
    }

    #[tokio::test]
    async fn test_ready_empty_store_yields_no_token() {
        let mgr = ready_manager(MemoryStore::new()).await;

        assert!(mgr.is_ready());
        assert_eq!(mgr.token(), None);
        assert!(!mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_ready_stored_token_is_loaded() {
        let mgr = ready_manager(MemoryStore::with_token("abc")).await;

        assert_eq!(mgr.token().as_deref(), Some("abc"));
        assert!(mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_ready_blank_stored_token_treated_as_none() {
        let mgr = ready_manager(MemoryStore::with_token("  ")).await;
        assert_eq!(mgr.token(), None);
    }

    #[tokio::test]
    async fn test_ready_read_failure_fails_open() {
        let store = ScriptedStore::default();
        store.fail_get.store(true, Ordering::SeqCst);
        let mgr = SessionManager::new(store);

        let snapshot = mgr.ready().await;

        assert!(snapshot.is_ready);
        assert!(!snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn test_ready_stays_true_after_mutations() {
        let mgr = ready_manager(MemoryStore::new()).await;

        mgr.set_token("abc").await.unwrap();
        assert!(mgr.is_ready());
        mgr.clear_token().await.unwrap();
        assert!(mgr.is_ready());
    }

    #[tokio::test]
    async fn test_ready_notifies_subscribers_once() {
        let store = Arc::new(ScriptedStore::holding_get());
        store.inner.set("abc").await.unwrap();
        let mgr = SessionManager::new(Arc::clone(&store));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mgr.subscribe(move |s| sink.lock().push(s.clone()));

        store.release_get.notify_one();
        mgr.ready().await;

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_ready);
        assert_eq!(seen[0].token.as_deref(), Some("abc"));
    }

    // =====================================================================
    // set_token()
    // =====================================================================

    #[tokio::test]
    async fn test_set_token_then_token_returns_it() {
        let mgr = ready_manager(MemoryStore::new()).await;

        mgr.set_token("abc").await.unwrap();

        assert_eq!(mgr.token().as_deref(), Some("abc"));
        assert!(mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_set_token_survives_restart() {
        let store = MemoryStore::new();
        let first = ready_manager(store.clone()).await;
        first.set_token("abc").await.unwrap();
        drop(first);

        let second = ready_manager(store).await;

        assert_eq!(second.token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_set_token_blank_returns_invalid_argument() {
        let store = Arc::new(ScriptedStore::default());
        let mgr = SessionManager::new(Arc::clone(&store));
        mgr.ready().await;

        for blank in ["", "   ", "\t\n"] {
            let result = mgr.set_token(blank).await;
            assert!(
                matches!(result, Err(SessionError::InvalidArgument(_))),
                "{blank:?} should be rejected"
            );
        }
        assert_eq!(store.sets.load(Ordering::SeqCst), 0, "no store write");
        assert_eq!(mgr.token(), None);
    }

    #[tokio::test]
    async fn test_set_token_store_failure_leaves_state_unchanged() {
        let store = Arc::new(ScriptedStore::default());
        let mgr = SessionManager::new(Arc::clone(&store));
        mgr.ready().await;
        mgr.set_token("old").await.unwrap();

        store.fail_set.store(true, Ordering::SeqCst);
        let result = mgr.set_token("new").await;

        assert!(matches!(result, Err(SessionError::Persistence(_))));
        assert_eq!(mgr.token().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_set_token_store_failure_does_not_notify() {
        let store = Arc::new(ScriptedStore::default());
        store.fail_set.store(true, Ordering::SeqCst);
        let mgr = SessionManager::new(Arc::clone(&store));
        mgr.ready().await;

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = mgr.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let _ = mgr.set_token("abc").await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_set_token_before_ready_waits_for_load() {
        // The load must not overwrite a login that was issued while the
        // store was still being read.
        let store = Arc::new(ScriptedStore::holding_get());
        store.inner.set("stale").await.unwrap();
        let mgr = SessionManager::new(Arc::clone(&store));

        let setter = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.set_token("fresh").await })
        };
        tokio::task::yield_now().await;
        assert!(!mgr.is_ready());

        store.release_get.notify_one();
        setter.await.unwrap().unwrap();

        assert!(mgr.is_ready());
        assert_eq!(mgr.token().as_deref(), Some("fresh"));
        assert_eq!(store.inner.stored().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_set_token_same_value_does_not_notify_again() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = mgr.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        mgr.set_token("abc").await.unwrap();
        mgr.set_token("abc").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // =====================================================================
    // clear_token()
    // =====================================================================

    #[tokio::test]
    async fn test_clear_token_clears_memory_and_store() {
        let store = MemoryStore::with_token("abc");
        let mgr = ready_manager(store.clone()).await;

        mgr.clear_token().await.unwrap();

        assert_eq!(mgr.token(), None);
        assert_eq!(store.stored(), None);
    }

    #[tokio::test]
    async fn test_clear_token_store_failure_still_clears_memory() {
        let store = Arc::new(ScriptedStore::default());
        let mgr = SessionManager::new(Arc::clone(&store));
        mgr.ready().await;
        mgr.set_token("abc").await.unwrap();

        store.fail_clear.store(true, Ordering::SeqCst);
        let result = mgr.clear_token().await;

        assert!(matches!(result, Err(SessionError::Persistence(_))));
        assert_eq!(mgr.token(), None);
        assert!(!mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_clear_token_twice_is_ok() {
        let mgr = ready_manager(MemoryStore::with_token("abc")).await;

        mgr.clear_token().await.unwrap();
        mgr.clear_token().await.unwrap();

        assert_eq!(mgr.token(), None);
    }

    #[tokio::test]
    async fn test_clear_token_when_logged_out_does_not_notify() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = mgr.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        mgr.clear_token().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_clear_restart_yields_no_token() {
        let store = MemoryStore::new();
        let first = ready_manager(store.clone()).await;
        first.set_token("T").await.unwrap();
        first.clear_token().await.unwrap();
        drop(first);

        let second = ready_manager(store).await;

        assert_eq!(second.token(), None);
    }

    // =====================================================================
    // clear_token_if()
    // =====================================================================

    #[tokio::test]
    async fn test_clear_token_if_matching_token_clears_memory_and_store() {
        let store = MemoryStore::new();
        let mgr = ready_manager(store.clone()).await;
        mgr.set_token("old").await.unwrap();

        let cleared = mgr.clear_token_if("old").await.unwrap();

        assert!(cleared);
        assert_eq!(mgr.token(), None);
        assert_eq!(store.stored(), None);
    }

    #[tokio::test]
    async fn test_clear_token_if_newer_token_keeps_session() {
        // A request sent with "old" comes back 401 after the user has
        // already logged in again with "new".
        let store = MemoryStore::new();
        let mgr = ready_manager(store.clone()).await;
        mgr.set_token("old").await.unwrap();
        mgr.set_token("new").await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _sub = mgr.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let cleared = mgr.clear_token_if("old").await.unwrap();

        assert!(!cleared);
        assert_eq!(mgr.token().as_deref(), Some("new"));
        assert_eq!(store.stored().as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_token_if_logged_out_is_noop() {
        let mgr = ready_manager(MemoryStore::new()).await;

        assert!(!mgr.clear_token_if("abc").await.unwrap());
    }

    // =====================================================================
    // subscribe()
    // =====================================================================

    #[tokio::test]
    async fn test_subscribe_two_listeners_each_notified_once() {
        let mgr = ready_manager(MemoryStore::new()).await;

        let a = Arc::new(Mutex::new(Vec::new()));
        let b = Arc::new(Mutex::new(Vec::new()));
        let (sa, sb) = (Arc::clone(&a), Arc::clone(&b));
        let _a = mgr.subscribe(move |s| sa.lock().push(s.is_authenticated()));
        let _b = mgr.subscribe(move |s| sb.lock().push(s.is_authenticated()));

        mgr.set_token("abc").await.unwrap();

        assert_eq!(*a.lock(), vec![true]);
        assert_eq!(*b.lock(), vec![true]);
    }

    #[tokio::test]
    async fn test_subscribe_sees_every_transition_in_order() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mgr.subscribe(move |s| sink.lock().push(s.token.clone()));

        mgr.set_token("a").await.unwrap();
        mgr.set_token("b").await.unwrap();
        mgr.clear_token().await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let sub = mgr.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        mgr.set_token("a").await.unwrap();
        sub.unsubscribe();
        mgr.set_token("b").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_listener_can_read_manager_inside_callback() {
        // Callbacks run after the state lock is released.
        let mgr = ready_manager(MemoryStore::new()).await;
        let seen = Arc::new(Mutex::new(None));
        let (inner, sink) = (mgr.clone(), Arc::clone(&seen));
        mgr.subscribe(move |_| *sink.lock() = inner.token()).detach();

        mgr.set_token("abc").await.unwrap();

        assert_eq!(seen.lock().as_deref(), Some("abc"));
        mgr.shutdown();
    }

    // =====================================================================
    // watch()
    // =====================================================================

    #[tokio::test]
    async fn test_watch_observes_latest_state() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let mut rx = mgr.watch();

        mgr.set_token("abc").await.unwrap();

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated());
    }

    // =====================================================================
    // shutdown()
    // =====================================================================

    #[tokio::test]
    async fn test_shutdown_discards_late_initial_load() {
        let store = Arc::new(ScriptedStore::holding_get());
        store.inner.set("abc").await.unwrap();
        let mgr = SessionManager::new(Arc::clone(&store));

        mgr.shutdown();
        store.release_get.notify_one();
        tokio::task::yield_now().await;

        assert!(!mgr.is_ready());
        assert_eq!(mgr.token(), None);
        assert!(mgr.is_shut_down());
    }

    #[tokio::test]
    async fn test_shutdown_releases_ready_waiters() {
        let store = Arc::new(ScriptedStore::holding_get());
        let mgr = SessionManager::new(Arc::clone(&store));

        let waiter = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.ready().await })
        };
        tokio::task::yield_now().await;
        mgr.shutdown();

        let snapshot = waiter.await.unwrap();
        assert!(!snapshot.is_ready);
    }

    #[tokio::test]
    async fn test_shutdown_drops_listeners_and_rejects_new_ones() {
        let mgr = ready_manager(MemoryStore::new()).await;
        let sub = mgr.subscribe(|_| {});

        mgr.shutdown();

        assert!(!sub.is_active());
        assert!(!mgr.subscribe(|_| {}).is_active());
        assert_eq!(mgr.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_every_handle_discards_pending_load() {
        let store = Arc::new(ScriptedStore::holding_get());
        store.inner.set("abc").await.unwrap();
        let mgr = SessionManager::new(Arc::clone(&store));
        let rx = mgr.watch();

        drop(mgr);
        store.release_get.notify_one();
        tokio::task::yield_now().await;

        assert!(!rx.borrow().is_ready);
    }
}
