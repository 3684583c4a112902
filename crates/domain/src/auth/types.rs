//! Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::id::EntityId;

/// How long a stored token pair stays valid on this device.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Access and refresh token, always held together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential sent as the bearer token.
    pub access_token: String,
    /// Longer-lived credential exchanged for a new pair.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never reach logs through Debug.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// A token pair with its local expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    /// The pair itself.
    #[serde(flatten)]
    pub pair: TokenPair,
    /// When this device forgets the pair.
    pub expires_at: DateTime<Utc>,
}

impl StoredTokens {
    /// Stores `pair` for [`TOKEN_TTL_DAYS`] from `now`.
    #[must_use]
    pub fn issue(pair: TokenPair, now: DateTime<Utc>) -> Self {
        Self {
            pair,
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Returns true once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plain password, sent over TLS only.
    pub password: String,
}

impl LoginRequest {
    /// Creates a login body.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token being exchanged.
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Payload returned by the login and refresh endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// New access token.
    pub access_token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Token type, normally `Bearer`.
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl AuthTokens {
    /// Drops the type and keeps the pair.
    #[must_use]
    pub fn into_pair(self) -> TokenPair {
        TokenPair::new(self.access_token, self.refresh_token)
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Role of a staff account.
///
/// Sent in lowercase; any casing is accepted on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access to configuration and staff.
    Admin,
    /// Registers appointments and sales.
    #[default]
    Barber,
}

impl UserRole {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Barber => "barber",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "barber" => Ok(Self::Barber),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The signed-in account, as returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server id.
    pub id: EntityId,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the account may sign in.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Formats a bearer Authorization value.
#[must_use]
pub fn bearer(access_token: &str) -> String {
    format!("Bearer {access_token}")
}

/// Get a preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        format!("{}...", token.get(..8).unwrap_or_default())
    } else {
        "***".to_string()
    }
}
