//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in a payload (its bytes or its
//! contents), not in the network or in session storage.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the server answered with HTML from a proxy, a
    /// required field is missing, or a date isn't `YYYY-MM-DD`.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload parsed fine but breaks a rule the backend enforces,
    /// e.g. a negative order price or a blank address. Caught locally so
    /// the user gets the message without a round trip.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
