//! `App` builder and the screen-level operations.
//!
//! This is the entry point for a front end. It ties together the layers:
//! session (who is logged in) → client (what the server says).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ubgrab_client::{Backend, ClientConfig, ClientError, HttpBackend};
use ubgrab_protocol::{
    Account, Courier, LoginRequest, NewOrder, Order, SeedClearReport,
    SeedFillReport,
};
use ubgrab_session::{
    FileStore, SessionManager, SessionSnapshot, SessionStore, Subscription,
};

use crate::UbgrabError;

/// Builder for an [`App`] backed by the real HTTP API and an on-disk
/// session.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use ubgrab::App;
///
/// # async fn run() -> Result<(), ubgrab::UbgrabError> {
/// let app = App::builder()
///     .base_url("http://10.0.2.2:8000/api/v1")
///     .request_timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppBuilder {
    config: ClientConfig,
    data_dir: Option<PathBuf>,
}

impl AppBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root, e.g. `http://192.168.0.14:8000/api/v1`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.config.login_timeout = timeout;
        self
    }

    pub fn seed_timeout(mut self, timeout: Duration) -> Self {
        self.config.seed_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Keeps the session file in `dir` instead of the platform data
    /// directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Builds the app and starts loading the stored session.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    /// - [`UbgrabError::Storage`] when no data directory was given and
    ///   the platform has none.
    /// - [`UbgrabError::Client`] when the HTTP client can't be created.
    pub fn build(self) -> Result<App<FileStore, HttpBackend>, UbgrabError> {
        let store = match self.data_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::default_location()?,
        };
        tracing::debug!(
            base_url = %self.config.base_url,
            session_file = %store.path().display(),
            "building app"
        );
        let backend = HttpBackend::new(self.config)?;
        Ok(App::new(store, backend))
    }
}

/// The client core: one login session plus the backend it authorizes.
///
/// Cloning is cheap and every clone shares the same session, so each
/// screen can hold its own handle.
pub struct App<S: SessionStore, B: Backend> {
    session: SessionManager<S>,
    backend: Arc<B>,
}

impl<S: SessionStore, B: Backend> Clone for App<S, B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl App<FileStore, HttpBackend> {
    /// Creates a new builder.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }
}

impl<S: SessionStore, B: Backend> App<S, B> {
    /// Wraps an existing store and backend. Starts loading the stored
    /// session in the background, so it must run inside a Tokio runtime.
    pub fn new(store: S, backend: B) -> Self {
        Self {
            session: SessionManager::new(store),
            backend: Arc::new(backend),
        }
    }

    /// The session manager, for subscribing or reading the token
    /// directly.
    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Waits for the stored session to load. Screens should show a
    /// loading state until this returns.
    pub async fn ready(&self) -> SessionSnapshot {
        self.session.ready().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Calls `listener` on every login, logout and on load completion.
    pub fn on_session_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.session.subscribe(listener)
    }

    // -- Auth --------------------------------------------------------------

    /// Exchanges phone + password for a token and stores it.
    ///
    /// The phone is trimmed. Nothing is sent when either field is blank.
    /// On any failure the current session is left as it was.
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<(), UbgrabError> {
        let request = LoginRequest::new(phone, password);
        request.validate()?;

        let token = self.backend.login(&request).await?;
        self.session.set_token(token.access_token).await?;
        tracing::info!("logged in");
        Ok(())
    }

    /// Forgets the token locally. The backend has no logout endpoint.
    pub async fn logout(&self) -> Result<(), UbgrabError> {
        self.session.clear_token().await?;
        Ok(())
    }

    /// The logged-in account.
    ///
    /// # Errors
    /// [`UbgrabError::NotAuthenticated`] when there is no token, or the
    /// server rejected it. A rejected token is cleared so every screen
    /// drops back to the login prompt, unless a newer login replaced it
    /// while the request was in flight.
    pub async fn profile(&self) -> Result<Account, UbgrabError> {
        let token = self.current_token().await?;
        let result = self.backend.me(&token).await;
        self.authorized(&token, result).await
    }

    // -- Orders and couriers -----------------------------------------------

    pub async fn couriers(&self) -> Result<Vec<Courier>, UbgrabError> {
        Ok(self.backend.couriers().await?)
    }

    pub async fn orders(&self) -> Result<Vec<Order>, UbgrabError> {
        Ok(self.backend.orders().await?)
    }

    /// Places an order as the logged-in customer.
    ///
    /// The order is validated locally first: both addresses must be
    /// non-blank and the price a non-negative number.
    pub async fn create_order(
        &self,
        order: &NewOrder,
    ) -> Result<Order, UbgrabError> {
        order.validate()?;
        let token = self.current_token().await?;
        let result = self.backend.create_order(&token, order).await;
        let created = self.authorized(&token, result).await?;
        tracing::info!(order_id = created.id, "order created");
        Ok(created)
    }

    // -- Test data ---------------------------------------------------------

    pub async fn seed_fill(&self) -> Result<SeedFillReport, UbgrabError> {
        Ok(self.backend.seed_fill().await?)
    }

    pub async fn seed_clear(&self) -> Result<SeedClearReport, UbgrabError> {
        Ok(self.backend.seed_clear().await?)
    }

    /// Stops session notifications. See [`SessionManager::shutdown`].
    pub fn shutdown(&self) {
        self.session.shutdown();
    }

    // -- Helpers -----------------------------------------------------------

    async fn current_token(&self) -> Result<String, UbgrabError> {
        self.session
            .ready()
            .await
            .token
            .ok_or(UbgrabError::NotAuthenticated)
    }

    /// Turns a 401 on a call made with `sent` into a logout, unless the
    /// session has moved on to another token in the meantime.
    async fn authorized<T>(
        &self,
        sent: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, UbgrabError> {
        match result {
            Ok(value) => Ok(value),
            Err(ClientError::Unauthorized(reason)) => {
                match self.session.clear_token_if(sent).await {
                    Ok(true) => {
                        tracing::warn!(%reason, "stored token rejected, logged out");
                    }
                    Ok(false) => {}
                    Err(error) => {
                        tracing::warn!(%error, "could not erase rejected token");
                    }
                }
                Err(UbgrabError::NotAuthenticated)
            }
            Err(other) => Err(other.into()),
        }
    }
}
