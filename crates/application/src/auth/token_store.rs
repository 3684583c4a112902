//! Token storage with a fixed local expiry.
//!
//! The store keeps the current pair in memory and mirrors every change to an
//! optional [`TokenRepository`] so a session survives restarts. Storage
//! failures are logged and read back as "no tokens".

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clipper_domain::{StoredTokens, TokenPair};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::ports::{Clock, TokenRepository};

/// Thread-safe token store.
///
/// Cloning is cheap and every clone sees the same pair.
#[derive(Clone)]
pub struct TokenStore {
    tokens: Arc<RwLock<Option<StoredTokens>>>,
    /// Bumped on every write, so callers can tell whether the pair changed.
    generation: Arc<AtomicU64>,
    repository: Option<Arc<dyn TokenRepository>>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            repository: None,
            clock,
        }
    }

    /// Create a store persisted through `repository`.
    ///
    /// Call [`TokenStore::restore`] once to pick up a previous session.
    #[must_use]
    pub fn with_repository(clock: Arc<dyn Clock>, repository: Arc<dyn TokenRepository>) -> Self {
        Self {
            repository: Some(repository),
            ..Self::new(clock)
        }
    }

    /// Load the persisted pair into memory.
    ///
    /// Returns true if a live pair was found. Expired or unreadable records
    /// are discarded.
    pub async fn restore(&self) -> bool {
        let Some(repository) = &self.repository else {
            return self.has_tokens().await;
        };

        let mut tokens = self.tokens.write().await;
        let loaded = match repository.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "could not read stored tokens; starting signed out");
                None
            }
        };

        let live = loaded.filter(|stored| {
            let expired = stored.is_expired(self.clock.now());
            if expired {
                debug!(expires_at = %stored.expires_at, "stored tokens expired");
            }
            !expired
        });

        if live.is_none()
            && let Err(e) = repository.clear().await
        {
            warn!(error = %e, "could not remove stale tokens");
        }

        let restored = live.is_some();
        *tokens = live;
        self.generation.fetch_add(1, Ordering::AcqRel);
        restored
    }

    /// Current access token, if a live pair is stored.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens().await.map(|pair| pair.access_token)
    }

    /// Current refresh token, if a live pair is stored.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens().await.map(|pair| pair.refresh_token)
    }

    /// Current pair, if live.
    pub async fn tokens(&self) -> Option<TokenPair> {
        let tokens = self.tokens.read().await;
        self.live(tokens.as_ref()).map(|stored| stored.pair.clone())
    }

    /// Access token together with the generation it belongs to.
    pub async fn snapshot(&self) -> (Option<String>, u64) {
        let tokens = self.tokens.read().await;
        let generation = self.generation.load(Ordering::Acquire);
        let access = self
            .live(tokens.as_ref())
            .map(|stored| stored.pair.access_token.clone());
        (access, generation)
    }

    /// Generation counter; changes whenever the pair is set or cleared.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store both tokens, replacing any previous pair.
    pub async fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let pair = TokenPair::new(access_token, refresh_token);
        let mut tokens = self.tokens.write().await;
        self.save(&mut tokens, pair).await;
    }

    /// Store `pair` only if nothing was written since `generation`.
    ///
    /// Returns false, leaving the store untouched, when a login, logout or
    /// another refresh got there first.
    pub async fn set_tokens_if(&self, generation: u64, pair: TokenPair) -> bool {
        let mut tokens = self.tokens.write().await;
        if self.generation() != generation {
            return false;
        }
        self.save(&mut tokens, pair).await;
        true
    }

    /// Remove both tokens. Safe to call when nothing is stored.
    pub async fn clear_tokens(&self) {
        let mut tokens = self.tokens.write().await;
        self.erase(&mut tokens).await;
    }

    /// Remove both tokens only if nothing was written since `generation`.
    pub async fn clear_tokens_if(&self, generation: u64) -> bool {
        let mut tokens = self.tokens.write().await;
        if self.generation() != generation {
            return false;
        }
        self.erase(&mut tokens).await;
        true
    }

    /// True iff both tokens are present and not expired.
    pub async fn has_tokens(&self) -> bool {
        let tokens = self.tokens.read().await;
        self.live(tokens.as_ref()).is_some()
    }

    async fn save(&self, tokens: &mut Option<StoredTokens>, pair: TokenPair) {
        let stored = StoredTokens::issue(pair, self.clock.now());
        if let Some(repository) = &self.repository
            && let Err(e) = repository.save(&stored).await
        {
            warn!(error = %e, "could not persist tokens; keeping them in memory only");
        }
        *tokens = Some(stored);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    async fn erase(&self, tokens: &mut Option<StoredTokens>) {
        if let Some(repository) = &self.repository
            && let Err(e) = repository.clear().await
        {
            warn!(error = %e, "could not remove persisted tokens");
        }
        *tokens = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn live<'a>(&self, stored: Option<&'a StoredTokens>) -> Option<&'a StoredTokens> {
        stored.filter(|s| !s.is_expired(self.clock.now()))
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("generation", &self.generation())
            .field("persistent", &self.repository.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::TokenRepositoryError;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct MemoryRepository {
        stored: Mutex<Option<StoredTokens>>,
        broken: bool,
    }

    #[async_trait]
    impl TokenRepository for MemoryRepository {
        async fn load(&self) -> Result<Option<StoredTokens>, TokenRepositoryError> {
            if self.broken {
                return Err(TokenRepositoryError::Serialization("corrupt".to_string()));
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, tokens: &StoredTokens) -> Result<(), TokenRepositoryError> {
            if self.broken {
                return Err(TokenRepositoryError::Io(std::io::Error::other("disk full")));
            }
            *self.stored.lock().unwrap() = Some(tokens.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), TokenRepositoryError> {
            *self.stored.lock().unwrap() = None;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_set_then_get_returns_same_values() {
        let store = TokenStore::new(ManualClock::new());
        store.set_tokens("access123", "refresh456").await;

        assert_eq!(store.access_token().await.as_deref(), Some("access123"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("refresh456"));
        assert!(store.has_tokens().await);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_pair() {
        let store = TokenStore::new(ManualClock::new());
        store.set_tokens("a1", "r1").await;
        store.set_tokens("a2", "r2").await;

        assert_eq!(store.tokens().await, Some(TokenPair::new("a2", "r2")));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = TokenStore::new(ManualClock::new());
        store.set_tokens("a", "r").await;

        store.clear_tokens().await;
        assert!(!store.has_tokens().await);
        store.clear_tokens().await;
        assert!(!store.has_tokens().await);
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_tokens_expire_after_seven_days() {
        let clock = ManualClock::new();
        let store = TokenStore::new(clock.clone());
        store.set_tokens("a", "r").await;

        clock.advance(Duration::days(6));
        assert!(store.has_tokens().await);

        clock.advance(Duration::days(1));
        assert!(!store.has_tokens().await);
        assert_eq!(store.access_token().await, None);
    }

    #[tokio::test]
    async fn test_generation_changes_on_every_write() {
        let store = TokenStore::new(ManualClock::new());
        let start = store.generation();

        store.set_tokens("a", "r").await;
        let (access, generation) = store.snapshot().await;
        assert_eq!(access.as_deref(), Some("a"));
        assert_eq!(generation, start + 1);

        store.clear_tokens().await;
        assert_eq!(store.generation(), start + 2);
    }

    #[tokio::test]
    async fn test_conditional_writes_lose_to_newer_writes() {
        let repository = Arc::new(MemoryRepository::default());
        let store = TokenStore::with_repository(ManualClock::new(), repository.clone());
        store.set_tokens("a1", "r1").await;
        let seen = store.generation();

        store.clear_tokens().await;
        assert!(!store.set_tokens_if(seen, TokenPair::new("a2", "r2")).await);
        assert!(!store.has_tokens().await);
        assert!(repository.stored.lock().unwrap().is_none());

        store.set_tokens("a3", "r3").await;
        assert!(!store.clear_tokens_if(seen).await);
        assert_eq!(store.access_token().await.as_deref(), Some("a3"));

        let current = store.generation();
        assert!(store.set_tokens_if(current, TokenPair::new("a4", "r4")).await);
        assert_eq!(store.generation(), current + 1);
        assert!(store.clear_tokens_if(current + 1).await);
        assert!(!store.has_tokens().await);
    }

    #[tokio::test]
    async fn test_persists_and_restores() {
        let clock = ManualClock::new();
        let repository = Arc::new(MemoryRepository::default());

        let first = TokenStore::with_repository(clock.clone(), repository.clone());
        first.set_tokens("a", "r").await;
        assert!(repository.stored.lock().unwrap().is_some());

        let second = TokenStore::with_repository(clock, repository);
        assert!(!second.has_tokens().await);
        assert!(second.restore().await);
        assert_eq!(second.access_token().await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_restore_discards_expired_record() {
        let clock = ManualClock::new();
        let repository = Arc::new(MemoryRepository::default());
        *repository.stored.lock().unwrap() = Some(StoredTokens::issue(
            TokenPair::new("old", "old-r"),
            clock.now() - Duration::days(8),
        ));

        let store = TokenStore::with_repository(clock, repository.clone());
        assert!(!store.restore().await);
        assert!(!store.has_tokens().await);
        assert!(repository.stored.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_to_absent() {
        let repository = Arc::new(MemoryRepository {
            broken: true,
            ..MemoryRepository::default()
        });
        let store = TokenStore::with_repository(ManualClock::new(), repository);

        assert!(!store.restore().await);
        assert!(!store.has_tokens().await);

        // A failed save still leaves a usable in-memory session.
        store.set_tokens("a", "r").await;
        assert!(store.has_tokens().await);
    }
}
