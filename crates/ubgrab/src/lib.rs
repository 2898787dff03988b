//! # ubgrab
//!
//! Client core for the ubgrab courier service.
//!
//! The app is a handful of screens (login, profile, orders, couriers, the
//! seed utilities) over one shared login session. This crate wires the
//! layers together so a front end only deals with [`App`]:
//!
//! - [`ubgrab_session`] keeps the bearer token, persists it and tells
//!   every screen when it changes.
//! - [`ubgrab_client`] talks to the REST API.
//! - [`ubgrab_protocol`] defines the payloads both sides agree on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ubgrab::prelude::*;
//!
//! # async fn run() -> Result<(), UbgrabError> {
//! let app = App::builder()
//!     .base_url("http://192.168.0.14:8000/api/v1")
//!     .build()?;
//! app.ready().await;
//!
//! app.login("+79990000000", "secret").await?;
//! let me = app.profile().await?;
//! println!("hello, {}", me.name);
//! # Ok(())
//! # }
//! ```

mod app;
mod error;

pub use app::{App, AppBuilder};
pub use error::UbgrabError;

pub use ubgrab_client;
pub use ubgrab_protocol;
pub use ubgrab_session;

/// Everything a front end usually needs, in one import.
pub mod prelude {
    pub use crate::{App, AppBuilder, UbgrabError};
    pub use ubgrab_client::{Backend, ClientConfig, ClientError, HttpBackend};
    pub use ubgrab_protocol::{
        Account, Courier, LoginRequest, NewOrder, Order, SeedClearReport,
        SeedFillReport, TokenResponse,
    };
    pub use ubgrab_session::{
        FileStore, MemoryStore, SessionError, SessionManager, SessionSnapshot,
        SessionStore, StorageError, Subscription,
    };
}
