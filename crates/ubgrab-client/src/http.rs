//! [`Backend`] implementation over HTTP using `reqwest`.

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use ubgrab_protocol::{
    Account, Codec, Courier, JsonCodec, LoginRequest, NewOrder, Order,
    SeedClearReport, SeedFillReport, TokenResponse,
};

use crate::{Backend, ClientConfig, ClientError};

/// Talks to the real backend.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally and
/// pools connections across clones.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    config: ClientConfig,
    codec: JsonCodec,
}

impl HttpBackend {
    /// Builds a client for the given configuration.
    ///
    /// # Errors
    /// [`ClientError::Request`] if the TLS backend can't be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ubgrab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;
        Ok(Self {
            http,
            config,
            codec: JsonCodec,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        timeout: Duration,
    ) -> RequestBuilder {
        self.http
            .request(method, self.config.url(path))
            .timeout(timeout)
    }

    fn with_json<B: Serialize>(
        &self,
        request: RequestBuilder,
        body: &B,
    ) -> Result<RequestBuilder, ClientError> {
        let bytes = self.codec.encode(body)?;
        Ok(request
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(bytes))
    }

    /// Sends `request` and decodes a 2xx body as `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        route: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response =
            request.send().await.map_err(ClientError::from_reqwest)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ClientError::from_reqwest)?;

        if !status.is_success() {
            let error = ClientError::from_status(status.as_u16(), &body);
            tracing::debug!(route, status = status.as_u16(), %error, "backend returned an error");
            return Err(error);
        }

        tracing::trace!(route, bytes = body.len(), "backend response");
        Ok(self.codec.decode(&body)?)
    }
}

impl Backend for HttpBackend {
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<TokenResponse, ClientError> {
        let builder = self.request(
            Method::POST,
            "auth/login",
            self.config.login_timeout,
        );
        let builder = self.with_json(builder, request)?;
        self.send("auth/login", builder).await
    }

    async fn me(&self, token: &str) -> Result<Account, ClientError> {
        let builder = self
            .request(Method::GET, "auth/me", self.config.request_timeout)
            .bearer_auth(token);
        self.send("auth/me", builder).await
    }

    async fn couriers(&self) -> Result<Vec<Courier>, ClientError> {
        let builder =
            self.request(Method::GET, "couriers", self.config.request_timeout);
        self.send("couriers", builder).await
    }

    async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        let builder =
            self.request(Method::GET, "orders", self.config.request_timeout);
        self.send("orders", builder).await
    }

    async fn create_order(
        &self,
        token: &str,
        order: &NewOrder,
    ) -> Result<Order, ClientError> {
        let builder = self
            .request(Method::POST, "orders", self.config.request_timeout)
            .bearer_auth(token);
        let builder = self.with_json(builder, order)?;
        self.send("orders", builder).await
    }

    async fn seed_fill(&self) -> Result<SeedFillReport, ClientError> {
        let builder =
            self.request(Method::GET, "seed/fill", self.config.seed_timeout);
        self.send("seed/fill", builder).await
    }

    async fn seed_clear(&self) -> Result<SeedClearReport, ClientError> {
        let builder = self.request(
            Method::DELETE,
            "seed/clear",
            self.config.seed_timeout,
        );
        self.send("seed/clear", builder).await
    }
}
