//! Sign-in state for the UI layer.
//!
//! [`AuthSession`] owns the "who is signed in" question. It drives the login
//! and logout exchanges, keeps the current [`User`] and reacts to the API
//! client giving up on a session.

use std::sync::Arc;

use clipper_domain::{
    AuthTokens, HttpMethod, LoginRequest, RequestConfig, SessionEvent, User,
};
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{ApiClient, LOGIN_ENDPOINT, ME_ENDPOINT};
use crate::error::{ApiError, ApiResult};
use crate::ports::{DataCache, Navigator};

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    loading: bool,
}

/// The parts needed to tear a session down locally.
///
/// Kept apart from the client so the expiry listener does not keep the
/// client's event channel open.
#[derive(Clone)]
struct Teardown {
    state: Arc<RwLock<SessionState>>,
    cache: Option<Arc<dyn DataCache>>,
    navigator: Arc<dyn Navigator>,
}

impl Teardown {
    async fn run(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all().await;
        }
        self.state.write().await.user = None;
        self.navigator.to_login();
    }
}

/// Session manager shared by the UI.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct AuthSession {
    client: Arc<ApiClient>,
    teardown: Teardown,
}

impl AuthSession {
    /// Creates a signed-out session on top of `client`.
    #[must_use]
    pub fn new(
        client: Arc<ApiClient>,
        cache: Option<Arc<dyn DataCache>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            teardown: Teardown {
                state: Arc::new(RwLock::new(SessionState::default())),
                cache,
                navigator,
            },
        }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Signs in and loads the account.
    ///
    /// A login whose account cannot be loaded is rolled back, so no tokens
    /// are left behind without a user.
    ///
    /// # Errors
    ///
    /// Returns the client error of the login or `/me` call. Bad credentials
    /// come back as [`ApiError::Unauthorized`].
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        self.set_loading(true).await;
        let result = self.sign_in(username, password).await;
        self.set_loading(false).await;

        match &result {
            Ok(user) => {
                info!(username = %user.username, role = user.role.as_str(), "signed in");
                self.client.publish(SessionEvent::LoggedIn {
                    username: user.username.clone(),
                });
            }
            Err(e) => warn!(username, error = %e, "sign in failed"),
        }
        result
    }

    async fn sign_in(&self, username: &str, password: &str) -> ApiResult<User> {
        let config = RequestConfig::new(HttpMethod::Post)
            .with_json(&LoginRequest::new(username, password))
            .map_err(|e| ApiError::InvalidBody(e.to_string()))?
            .skip_auth();

        let tokens = self
            .client
            .request::<AuthTokens>(LOGIN_ENDPOINT, config)
            .await?
            .into_data()?;
        self.client
            .tokens()
            .set_tokens(tokens.access_token, tokens.refresh_token)
            .await;

        match self.fetch_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                self.client.tokens().clear_tokens().await;
                Err(e)
            }
        }
    }

    /// Ends the session: cached data, tokens and user are dropped and the
    /// user is sent to the login page.
    pub async fn logout(&self) {
        self.client.tokens().clear_tokens().await;
        self.teardown.run().await;
        self.client.publish(SessionEvent::LoggedOut);
        info!("signed out");
    }

    /// Reloads the account from `/me`.
    ///
    /// Returns `Ok(None)` without a network call when no tokens are stored.
    ///
    /// # Errors
    ///
    /// Returns the client error of the `/me` call. Errors that require a new
    /// login also clear the user.
    pub async fn refetch(&self) -> ApiResult<Option<User>> {
        if !self.client.tokens().has_tokens().await {
            self.teardown.state.write().await.user = None;
            return Ok(None);
        }

        self.set_loading(true).await;
        let result = self.fetch_user().await;
        self.set_loading(false).await;

        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                if e.requires_login() {
                    self.teardown.state.write().await.user = None;
                }
                Err(e)
            }
        }
    }

    /// Picks up a persisted session, if any, and loads its account.
    ///
    /// # Errors
    ///
    /// See [`AuthSession::refetch`].
    pub async fn restore(&self) -> ApiResult<Option<User>> {
        if self.client.tokens().restore().await {
            debug!("stored session found");
        }
        self.refetch().await
    }

    /// The signed-in account.
    pub async fn current_user(&self) -> Option<User> {
        self.teardown.state.read().await.user.clone()
    }

    /// True while a login or account reload is running.
    pub async fn is_loading(&self) -> bool {
        self.teardown.state.read().await.loading
    }

    /// True when an account is loaded.
    pub async fn is_authenticated(&self) -> bool {
        self.teardown.state.read().await.user.is_some()
    }

    /// Watches the client for expired sessions and tears the local session
    /// down when one is reported.
    ///
    /// The task ends when the client is dropped.
    #[must_use]
    pub fn spawn_expiry_listener(&self) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let teardown = self.teardown.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Expired { reason }) => {
                        warn!(reason = reason.describe(), "session expired");
                        teardown.run().await;
                    }
                    Ok(event) => debug!(?event, "session event"),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "session listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn fetch_user(&self) -> ApiResult<User> {
        let user = self.client.get::<User>(ME_ENDPOINT).await?.into_data()?;
        self.teardown.state.write().await.user = Some(user.clone());
        Ok(user)
    }

    async fn set_loading(&self, loading: bool) {
        self.teardown.state.write().await.loading = loading;
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
