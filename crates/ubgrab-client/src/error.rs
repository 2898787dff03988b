//! Errors that can occur while talking to the backend.

use ubgrab_protocol::{ApiErrorBody, Codec, JsonCodec, ProtocolError};

/// Errors that can occur in the client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request didn't finish within its timeout. Usually the server
    /// is down or unreachable from this network.
    #[error("request timed out; check that the server is running and reachable")]
    Timeout,

    /// The server rejected the bearer token (HTTP 401), or the login
    /// credentials were wrong.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` from the error body, the raw body, or `HTTP <code>`.
        message: String,
    },

    /// Connecting, sending, or reading the response failed.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body didn't match the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// `true` for [`ClientError::Timeout`]. The UI shows a dedicated
    /// "server unreachable" message for it.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// `true` if the server said the token (or the credentials) is not
    /// accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(error)
        }
    }

    /// Builds the error for a non-2xx response.
    ///
    /// The message is picked in this order: a string `detail` from the
    /// JSON error body, the raw body text, then `HTTP <status>`.
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = JsonCodec
            .decode::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message().map(str::to_string));
        let message = detail
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| format!("HTTP {status}"));

        if status == 401 {
            Self::Unauthorized(message)
        } else {
            Self::Status { status, message }
        }
    }
}
