//! Wire types for the ubgrab courier backend.
//!
//! This crate defines the "language" the client and the REST API speak:
//!
//! - **Types** ([`Order`], [`Courier`], [`Account`], [`NewOrder`], etc.) —
//!   the JSON bodies that travel over HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding, decoding, or local validation.
//!
//! # Architecture
//!
//! The protocol layer sits under both the HTTP client and the session
//! store. It knows nothing about connections or tokens' lifecycle,
//! only how payloads look.
//!
//! ```text
//! Client (HTTP) ─┐
//!                ├→ Protocol (payload types + codec)
//! Session store ─┘
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` lifts items to the crate root so users write
// `ubgrab_protocol::Order` instead of `ubgrab_protocol::types::Order`.

pub use codec::Codec;
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Account, ApiErrorBody, Courier, LoginRequest, NewOrder, Order,
    SeedClearReport, SeedFillReport, TokenResponse, DEFAULT_ORDER_STATUS,
};
