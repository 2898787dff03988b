//! Client for the ubgrab courier backend.
//!
//! Provides the [`Backend`] trait, which abstracts over how the app talks
//! to the REST API, and [`HttpBackend`], the real implementation.
//!
//! The trait exists so the app facade can be exercised against an
//! in-process fake, without a running server.

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod http;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use http::HttpBackend;

use std::future::Future;

use ubgrab_protocol::{
    Account, Courier, LoginRequest, NewOrder, Order, SeedClearReport,
    SeedFillReport, TokenResponse,
};

/// Everything the app asks of the backend.
///
/// Methods that take a `token` send it as `Authorization: Bearer <token>`.
/// The rest are public endpoints.
pub trait Backend: Send + Sync + 'static {
    /// `POST /auth/login`: exchanges phone + password for a token.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<TokenResponse, ClientError>> + Send;

    /// `GET /auth/me`: the account the token belongs to.
    fn me(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Account, ClientError>> + Send;

    /// `GET /couriers`.
    fn couriers(
        &self,
    ) -> impl Future<Output = Result<Vec<Courier>, ClientError>> + Send;

    /// `GET /orders`.
    fn orders(
        &self,
    ) -> impl Future<Output = Result<Vec<Order>, ClientError>> + Send;

    /// `POST /orders`: the customer is derived from the token.
    fn create_order(
        &self,
        token: &str,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ClientError>> + Send;

    /// `GET /seed/fill`: inserts test customers and couriers.
    fn seed_fill(
        &self,
    ) -> impl Future<Output = Result<SeedFillReport, ClientError>> + Send;

    /// `DELETE /seed/clear`: wipes every table.
    fn seed_clear(
        &self,
    ) -> impl Future<Output = Result<SeedClearReport, ClientError>> + Send;
}

/// Lets several apps (or an app and a test) share one backend.
impl<B: Backend> Backend for std::sync::Arc<B> {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<TokenResponse, ClientError>> + Send {
        (**self).login(request)
    }

    fn me(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Account, ClientError>> + Send {
        (**self).me(token)
    }

    fn couriers(
        &self,
    ) -> impl Future<Output = Result<Vec<Courier>, ClientError>> + Send {
        (**self).couriers()
    }

    fn orders(
        &self,
    ) -> impl Future<Output = Result<Vec<Order>, ClientError>> + Send {
        (**self).orders()
    }

    fn create_order(
        &self,
        token: &str,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ClientError>> + Send {
        (**self).create_order(token, order)
    }

    fn seed_fill(
        &self,
    ) -> impl Future<Output = Result<SeedFillReport, ClientError>> + Send {
        (**self).seed_fill()
    }

    fn seed_clear(
        &self,
    ) -> impl Future<Output = Result<SeedClearReport, ClientError>> + Send {
        (**self).seed_clear()
    }
}
