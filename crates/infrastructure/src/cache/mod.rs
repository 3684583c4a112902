//! Read caches

mod query_cache;

pub use query_cache::{DEFAULT_CACHE_TTL, MokaQueryCache};
