//! Loyalty program settings

use std::sync::Arc;

use clipper_domain::shop::LoyaltySettings;
use tracing::info;

use super::{cached_get, invalidate};
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::ports::DataCache;

const SETTINGS_ENDPOINT: &str = "/loyalty/settings";

/// Reads and replaces the shop's loyalty settings.
#[derive(Clone)]
pub struct LoyaltyApi {
    client: Arc<ApiClient>,
    cache: Option<Arc<dyn DataCache>>,
}

impl LoyaltyApi {
    /// Creates the wrapper.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, cache: Option<Arc<dyn DataCache>>) -> Self {
        Self { client, cache }
    }

    /// Current settings.
    ///
    /// # Errors
    ///
    /// Returns the client error or the server's rejection.
    pub async fn settings(&self) -> ApiResult<LoyaltySettings> {
        cached_get(&self.client, self.cache.as_deref(), SETTINGS_ENDPOINT).await
    }

    /// Replaces the settings. The server recomputes discounts from then on.
    ///
    /// # Errors
    ///
    /// Returns the client error or the server's rejection.
    pub async fn update(&self, settings: &LoyaltySettings) -> ApiResult<LoyaltySettings> {
        let saved = self
            .client
            .put::<LoyaltySettings, _>(SETTINGS_ENDPOINT, settings)
            .await?
            .into_data()?;
        invalidate(self.cache.as_deref(), &[SETTINGS_ENDPOINT]).await;
        info!(
            enabled = saved.enabled,
            visits_required = saved.visits_required,
            "loyalty settings updated"
        );
        Ok(saved)
    }
}

impl std::fmt::Debug for LoyaltyApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoyaltyApi").finish_non_exhaustive()
    }
}
