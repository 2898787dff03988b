//! The session record: what every consumer gets to see.
//!
//! A session is the client's memory of who is logged in. It tracks:
//! - WHETHER the startup load from the store has finished (`is_ready`)
//! - WHAT credential the user holds, if any (`token`)
//!
//! Consumers only ever get copies ([`SessionSnapshot`]). The real state is
//! owned by the [`SessionManager`](crate::SessionManager).

use std::fmt;

/// A read-only copy of the session at one instant.
///
/// ## Lifecycle
///
/// ```text
///   initializing ──(initial load)──→ ready, token = stored value or None
///   { is_ready: false,                      │
///     token: None }                         ├─ set_token(t) → token = Some(t)
///                                           └─ clear_token() → token = None
/// ```
///
/// `is_ready` goes from `false` to `true` exactly once and never back.
/// While it is `false` the login state is *unknown*, not "logged out":
/// a consumer that routes to a login screen on `!is_authenticated()`
/// should first check `is_ready`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// The bearer token, or `None` when nobody is logged in.
    pub token: Option<String>,

    /// `true` once the persisted token has been loaded (or the load failed
    /// and was treated as "no token").
    pub is_ready: bool,
}

impl SessionSnapshot {
    /// The state every manager starts in.
    pub fn initializing() -> Self {
        Self::default()
    }

    /// `true` if a non-empty token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// `Debug` is hand-written so snapshots can go into logs and test
/// failure messages without leaking the credential.
impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("is_ready", &self.is_ready)
            .finish()
    }
}
