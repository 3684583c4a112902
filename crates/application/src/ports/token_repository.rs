//! Durable token storage port

use async_trait::async_trait;
use clipper_domain::StoredTokens;

/// Errors that can occur while persisting tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenRepositoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Repository trait for the persisted token pair.
///
/// Implementations store both tokens as one record so a reader never sees
/// one without the other.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Loads the stored pair. Returns `None` if nothing is stored.
    async fn load(&self) -> Result<Option<StoredTokens>, TokenRepositoryError>;

    /// Replaces the stored pair.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    async fn save(&self, tokens: &StoredTokens) -> Result<(), TokenRepositoryError>;

    /// Removes the stored pair. Removing nothing is not an error.
    async fn clear(&self) -> Result<(), TokenRepositoryError>;
}
