//! Dashboard summary

use std::sync::Arc;

use clipper_domain::shop::{DashboardSummary, Period};

use super::cached_get;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::ports::DataCache;

/// Read-only access to the figures the server aggregates.
#[derive(Clone)]
pub struct AnalyticsApi {
    client: Arc<ApiClient>,
    cache: Option<Arc<dyn DataCache>>,
}

impl AnalyticsApi {
    /// Creates the wrapper.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, cache: Option<Arc<dyn DataCache>>) -> Self {
        Self { client, cache }
    }

    /// Dashboard figures for `period`.
    ///
    /// # Errors
    ///
    /// Returns the client error or the server's rejection.
    pub async fn dashboard(&self, period: Period) -> ApiResult<DashboardSummary> {
        let endpoint = format!("/analytics/dashboard?period={}", period.as_str());
        cached_get(&self.client, self.cache.as_deref(), &endpoint).await
    }
}

impl std::fmt::Debug for AnalyticsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsApi").finish_non_exhaustive()
    }
}
