//! Wires the adapters into a ready-to-use client.

use std::sync::Arc;

use clipper_application::ports::{DataCache, Navigator, TransportError};
use clipper_application::{ApiClient, AuthSession, Resources, TokenStore};
use tracing::debug;

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::cache::MokaQueryCache;
use crate::config::ClientConfig;
use crate::persistence::FileTokenRepository;

/// Everything a front end needs, sharing one client and one cache.
#[derive(Debug, Clone)]
pub struct ClipperServices {
    /// The authenticated client.
    pub client: Arc<ApiClient>,
    /// Sign-in state.
    pub session: AuthSession,
    /// Typed resource APIs.
    pub resources: Resources,
}

impl ClipperServices {
    /// Builds the reqwest transport, the file-backed token store and the
    /// read cache described by `config`.
    ///
    /// The persisted session is not loaded; call [`AuthSession::restore`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn connect(
        config: &ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout(), &config.user_agent)?;
        let tokens = TokenStore::with_repository(
            Arc::new(SystemClock::new()),
            Arc::new(FileTokenRepository::in_dir(&config.data_dir)),
        );
        let client = Arc::new(ApiClient::new(
            config.api_url.clone(),
            Arc::new(transport),
            tokens,
        ));

        let cache = config
            .cache_ttl()
            .map(|ttl| Arc::new(MokaQueryCache::new(ttl)) as Arc<dyn DataCache>);

        debug!(
            api_url = %config.api_url,
            data_dir = %config.data_dir.display(),
            cached = cache.is_some(),
            "client configured"
        );

        Ok(Self {
            session: AuthSession::new(client.clone(), cache.clone(), navigator),
            resources: Resources::new(client.clone(), cache),
            client,
        })
    }
}
