//! Payload types for the courier backend's REST API.
//!
//! Every struct here mirrors a JSON body the backend sends or accepts.
//! Field names match the wire exactly (snake_case), so no `rename`
//! attributes are needed.
//!
//! Timestamps (`created_at`, `updated_at`) are kept as the ISO-8601
//! strings the server sends. The client only displays them, and the
//! backend is not consistent about including a UTC offset. `date_when`
//! is a calendar date and is parsed into a [`NaiveDate`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Status given to every order created from the client.
pub const DEFAULT_ORDER_STATUS: &str = "new";

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

impl LoginRequest {
    /// Builds a login request, trimming surrounding whitespace from the
    /// phone number. The password is sent as typed.
    pub fn new(phone: impl AsRef<str>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.as_ref().trim().to_string(),
            password: password.into(),
        }
    }

    /// Checks the fields the backend requires to be non-empty.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.phone.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "phone is required".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "password is required".into(),
            ));
        }
        Ok(())
    }
}

/// Successful response of `POST /auth/login`.
///
/// `access_token` is an opaque bearer credential. The client never parses
/// it; it only stores it and echoes it back in `Authorization` headers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Manual `Debug` so the token never ends up in logs.
impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// The logged-in account, as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// Couriers and orders
// ---------------------------------------------------------------------------

/// A courier that can be picked when creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    pub id: i64,
    pub phone: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A delivery order, as listed by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub where_to: String,
    pub where_from: String,
    pub price: f64,
    pub status: String,
    pub date_when: NaiveDate,
    pub customer_id: i64,
    #[serde(default)]
    pub courier_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /orders`.
///
/// There is no `customer_id` here on purpose: the backend takes it from
/// the bearer token of the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub where_from: String,
    pub where_to: String,
    pub price: f64,
    pub date_when: NaiveDate,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_id: Option<i64>,
}

impl NewOrder {
    /// Builds an order with the default status and no courier.
    /// Addresses are trimmed.
    pub fn new(
        where_from: impl AsRef<str>,
        where_to: impl AsRef<str>,
        price: f64,
        date_when: NaiveDate,
    ) -> Self {
        Self {
            where_from: where_from.as_ref().trim().to_string(),
            where_to: where_to.as_ref().trim().to_string(),
            price,
            date_when,
            status: DEFAULT_ORDER_STATUS.to_string(),
            courier_id: None,
        }
    }

    /// Sets the preferred courier.
    pub fn with_courier(mut self, courier_id: i64) -> Self {
        self.courier_id = Some(courier_id);
        self
    }

    /// Checks the same rules the backend applies to `OrderCreate`.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.where_from.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "where_from is required".into(),
            ));
        }
        if self.where_to.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "where_to is required".into(),
            ));
        }
        // `!(x >= 0.0)` rather than `x < 0.0` so NaN is rejected too.
        if !self.price.is_finite() || !(self.price >= 0.0) {
            return Err(ProtocolError::InvalidMessage(format!(
                "price must be a number >= 0, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seed utilities
// ---------------------------------------------------------------------------

/// Response of `GET /seed/fill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFillReport {
    pub message: String,
    pub customers: u64,
    pub couriers: u64,
}

/// Response of `DELETE /seed/clear`: how many rows of each kind were removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedClearReport {
    pub message: String,
    pub reviews: u64,
    pub orders: u64,
    pub customers: u64,
    pub couriers: u64,
}

// ---------------------------------------------------------------------------
// Errors from the backend
// ---------------------------------------------------------------------------

/// The error body the backend sends with non-2xx responses.
///
/// `detail` is a plain string for hand-raised errors ("Order not found")
/// but a list of objects for request validation failures, so it is kept
/// as a raw JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// The human-readable message, if `detail` is a string.
    pub fn message(&self) -> Option<&str> {
        self.detail.as_str()
    }
}

// =========================================================================
// Tests
// =========================================================================
