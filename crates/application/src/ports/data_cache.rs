//! Cache port for read responses

use async_trait::async_trait;
use serde_json::Value;

/// Cache of decoded GET payloads keyed by endpoint.
///
/// Resource reads go through it; writes and logout invalidate it. Every
/// invalidation bumps [`DataCache::epoch`] before dropping entries.
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Returns the cached payload for `key`.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores a payload.
    async fn put(&self, key: &str, value: Value);

    /// Drops the entry for exactly `key`.
    async fn remove(&self, key: &str);

    /// Invalidation counter.
    fn epoch(&self) -> u64;

    /// Stores a payload fetched at `epoch`, unless an invalidation ran since.
    ///
    /// Returns true if the entry was kept.
    async fn put_fresh(&self, key: &str, value: Value, epoch: u64) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        self.put(key, value).await;
        // An invalidation may have scanned the keys before this insert landed.
        if self.epoch() != epoch {
            self.remove(key).await;
            return false;
        }
        true
    }

    /// Drops every entry whose key starts with `prefix`.
    async fn invalidate_prefix(&self, prefix: &str);

    /// Drops everything.
    async fn invalidate_all(&self);
}
