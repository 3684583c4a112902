//! In-memory cache of GET payloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clipper_application::ports::DataCache;
use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

/// How long a read stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

const MAX_ENTRIES: u64 = 1_000;

/// [`DataCache`] on a moka future cache with a fixed time-to-live.
#[derive(Clone)]
pub struct MokaQueryCache {
    entries: Cache<String, Value>,
    epoch: Arc<AtomicU64>,
}

impl MokaQueryCache {
    /// Creates a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self {
            entries,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of live entries, after pending maintenance has run.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MokaQueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for MokaQueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaQueryCache")
            .field("entries", &self.entries.entry_count())
            .field("epoch", &self.epoch())
            .finish()
    }
}

#[async_trait]
impl DataCache for MokaQueryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).await
    }

    async fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value).await;
    }

    async fn remove(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        debug!(prefix, count = stale.len(), "dropping cached reads");
        for key in stale {
            self.entries.invalidate(&key).await;
        }
    }

    async fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}
