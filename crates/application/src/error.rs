//! Application error types

use clipper_domain::{ApiFailure, DomainError, ExpiryReason};
use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced by the API client and everything built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received. Never retried.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status other than 401.
    #[error("{message} (HTTP {status})")]
    Api {
        /// HTTP status.
        status: u16,
        /// Server-provided reason or a generic fallback.
        message: String,
        /// Server error code.
        code: Option<String>,
    },

    /// The server answered 401 and no refresh could fix it for this call.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Server-provided reason or a generic fallback.
        message: String,
    },

    /// Credentials could not be renewed; tokens were cleared.
    #[error("session expired: {}", reason.describe())]
    SessionExpired {
        /// Why the refresh failed.
        reason: ExpiryReason,
    },

    /// The call that was refreshing on our behalf went away before finishing.
    #[error("token refresh was interrupted")]
    RefreshInterrupted,

    /// The server answered 2xx with `success: false`.
    #[error("request rejected: {0}")]
    Rejected(#[from] ApiFailure),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The response body was not a valid envelope.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The envelope did not carry what the caller expected.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// Returns true if the user must sign in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::SessionExpired { .. } | Self::RefreshInterrupted
        )
    }

    /// HTTP status behind the error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
