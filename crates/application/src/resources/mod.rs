//! Typed access to the barbershop endpoints.
//!
//! Every call goes through the [`ApiClient`], so these wrappers inherit
//! bearer handling and transparent refresh. Reads can be served from a
//! [`DataCache`]; writes drop the entries they make stale.

mod analytics;
mod loyalty;
mod resource_api;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use analytics::AnalyticsApi;
pub use loyalty::LoyaltyApi;
pub use resource_api::{AppointmentApi, CatalogApi, CustomerApi, ResourceApi, StaffApi};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::ports::DataCache;

/// Entry point to every resource API.
#[derive(Clone)]
pub struct Resources {
    client: Arc<ApiClient>,
    cache: Option<Arc<dyn DataCache>>,
}

impl Resources {
    /// Creates the facade. Without a cache every read hits the server.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, cache: Option<Arc<dyn DataCache>>) -> Self {
        Self { client, cache }
    }

    /// `/customers`.
    #[must_use]
    pub fn customers(&self) -> CustomerApi {
        ResourceApi::new(self.client.clone(), self.cache.clone(), "/customers")
    }

    /// `/staff`.
    #[must_use]
    pub fn staff(&self) -> StaffApi {
        ResourceApi::new(self.client.clone(), self.cache.clone(), "/staff")
    }

    /// `/catalog`.
    #[must_use]
    pub fn catalog(&self) -> CatalogApi {
        ResourceApi::new(self.client.clone(), self.cache.clone(), "/catalog")
    }

    /// `/appointments`.
    ///
    /// Registering a sale changes visit counts and dashboard figures, so
    /// writes here also drop cached customers and analytics.
    #[must_use]
    pub fn appointments(&self) -> AppointmentApi {
        ResourceApi::new(self.client.clone(), self.cache.clone(), "/appointments")
            .also_invalidates(&["/customers", "/analytics"])
    }

    /// `/loyalty/settings`.
    #[must_use]
    pub fn loyalty(&self) -> LoyaltyApi {
        LoyaltyApi::new(self.client.clone(), self.cache.clone())
    }

    /// `/analytics/dashboard`.
    #[must_use]
    pub fn analytics(&self) -> AnalyticsApi {
        AnalyticsApi::new(self.client.clone(), self.cache.clone())
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("base_url", &self.client.base_url())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// GET `endpoint`, answering from `cache` when it holds the payload.
pub(crate) async fn cached_get<T: DeserializeOwned>(
    client: &ApiClient,
    cache: Option<&dyn DataCache>,
    endpoint: &str,
) -> ApiResult<T> {
    if let Some(cache) = cache
        && let Some(value) = cache.get(endpoint).await
    {
        match serde_json::from_value(value) {
            Ok(data) => {
                debug!(endpoint, "cache hit");
                return Ok(data);
            }
            Err(e) => debug!(endpoint, error = %e, "cached payload unusable; refetching"),
        }
    }

    let epoch = cache.map(DataCache::epoch);
    let value = client.get::<Value>(endpoint).await?.into_data()?;
    let data = serde_json::from_value(value.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
    if let (Some(cache), Some(epoch)) = (cache, epoch)
        && !cache.put_fresh(endpoint, value, epoch).await
    {
        debug!(endpoint, "invalidated while fetching; not cached");
    }
    Ok(data)
}

/// Drops every cached entry under `prefixes`.
pub(crate) async fn invalidate(cache: Option<&dyn DataCache>, prefixes: &[&str]) {
    if let Some(cache) = cache {
        for prefix in prefixes {
            cache.invalidate_prefix(prefix).await;
        }
    }
}
