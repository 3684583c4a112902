//! Session lifecycle signals.
//!
//! The API client publishes these instead of navigating anywhere itself; the
//! session manager (or any other subscriber) decides what the user sees.

use serde::{Deserialize, Serialize};

/// Why a session could not be kept alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// No refresh token was stored.
    NoRefreshToken,
    /// The server refused the refresh token.
    RefreshRejected,
    /// The refresh call never got an answer.
    RefreshUnreachable,
    /// The session was signed out while a refresh was running.
    SignedOut,
}

impl ExpiryReason {
    /// Short description for logs and users.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::NoRefreshToken => "no refresh token available",
            Self::RefreshRejected => "refresh token rejected",
            Self::RefreshUnreachable => "refresh endpoint unreachable",
            Self::SignedOut => "signed out during refresh",
        }
    }
}

/// Events emitted over the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in.
    LoggedIn {
        /// Login name.
        username: String,
    },
    /// The access token was renewed transparently.
    TokensRefreshed,
    /// The session ended on request.
    LoggedOut,
    /// The session ended because credentials could not be renewed.
    Expired {
        /// What went wrong.
        reason: ExpiryReason,
    },
}
