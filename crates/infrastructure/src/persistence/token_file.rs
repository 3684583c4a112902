//! File-based token repository.
//!
//! The pair is kept in `session.json` inside the data directory:
//! ```json
//! {
//!   "access_token": "eyJ...",
//!   "refresh_token": "eyJ...",
//!   "expires_at": "2025-03-08T10:00:00Z"
//! }
//! ```
//! Both tokens live in one record and are replaced through a temp file and a
//! rename, so a reader never sees a half-written pair.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clipper_application::ports::{TokenRepository, TokenRepositoryError};
use clipper_domain::StoredTokens;
use tokio::fs;

/// Session file name inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Token repository backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenRepository {
    path: PathBuf,
}

impl FileTokenRepository {
    /// Stores the session in `dir/session.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    /// Stores the session at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// File location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl TokenRepository for FileTokenRepository {
    async fn load(&self) -> Result<Option<StoredTokens>, TokenRepositoryError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| TokenRepositoryError::Serialization(e.to_string()))
    }

    async fn save(&self, tokens: &StoredTokens) -> Result<(), TokenRepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(tokens)
            .map_err(|e| TokenRepositoryError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, &content).await?;
        restrict_to_owner(&temp).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenRepositoryError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
