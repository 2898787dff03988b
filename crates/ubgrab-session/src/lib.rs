//! Session state for the ubgrab client.
//!
//! This crate answers one question for every screen of the app: "is there a
//! logged-in user, and what is their bearer token?"
//!
//! 1. **Persistence** — the token survives restarts through a
//!    [`SessionStore`] ([`FileStore`] on disk, [`MemoryStore`] for tests).
//! 2. **State** — [`SessionManager`] owns the in-memory [`SessionSnapshot`],
//!    loads it once at startup and is the only thing allowed to change it.
//! 3. **Propagation** — any number of consumers [`subscribe`] and are told
//!    about every change.
//!
//! [`subscribe`]: SessionManager::subscribe
//!
//! # How it fits in the stack
//!
//! ```text
//! App facade (above)   ← logs in/out through the manager, reads the token
//!     ↕
//! Session layer (this crate)  ← token lifecycle, persist-before-publish
//!     ↕
//! Store (below)        ← one secret under a fixed key
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod file_store;
mod listeners;
mod manager;
mod session;
mod store;

pub use error::{SessionError, StorageError};
pub use file_store::FileStore;
pub use listeners::Subscription;
pub use manager::SessionManager;
pub use session::SessionSnapshot;
pub use store::{MemoryStore, SessionStore, TOKEN_KEY};
