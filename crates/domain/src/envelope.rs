//! The uniform response envelope every API endpoint returns.
//!
//! On the wire each body looks like
//! `{ success, data?, message?, error?, code?, timestamp }`. [`Envelope`]
//! mirrors that shape; [`ApiResponse`] is the checked form handed to callers,
//! where a success always carries its payload and a failure always carries
//! its reason.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Fallback reason when the server gives none.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Response envelope as sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Whether the server considers the call successful.
    pub success: bool,
    /// Payload, present on most successful calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: String,
}

impl<T> Envelope<T> {
    /// A successful envelope with nothing in it, standing in for empty
    /// bodies such as `204 No Content`.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
            code: None,
            timestamp: String::new(),
        }
    }

    /// The best available failure reason: `error`, then `message`.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

impl Envelope<Value> {
    /// Decodes the JSON payload into `T`, producing the checked response.
    ///
    /// A successful envelope without `data` is accepted only when `T` can be
    /// built from `null` (`()` or `Option<_>`).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingData`] when a required payload is absent
    /// and [`DomainError::InvalidPayload`] when it does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> DomainResult<ApiResponse<T>> {
        if !self.success {
            return Ok(ApiResponse::Failure(ApiFailure {
                error: self.error,
                code: self.code,
                message: self.message,
                timestamp: self.timestamp,
            }));
        }

        let data = match self.data {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| DomainError::InvalidPayload(e.to_string()))?,
            None => serde_json::from_value(Value::Null).map_err(|_| DomainError::MissingData)?,
        };

        Ok(ApiResponse::Success {
            data,
            message: self.message,
            timestamp: self.timestamp,
        })
    }
}

/// Failure half of [`ApiResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiFailure {
    /// Error description.
    pub error: Option<String>,
    /// Machine readable code.
    pub code: Option<String>,
    /// Human readable message.
    pub message: Option<String>,
    /// Server timestamp.
    pub timestamp: String,
}

impl ApiFailure {
    /// The reason to show a user.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or(GENERIC_FAILURE)
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.reason()),
            None => write!(f, "{}", self.reason()),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// A decoded API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The call succeeded and produced `data`.
    Success {
        /// Decoded payload.
        data: T,
        /// Optional server message.
        message: Option<String>,
        /// Server timestamp.
        timestamp: String,
    },
    /// The server answered 2xx but reported `success: false`.
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    /// Returns true for the success variant.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Borrows the payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// Takes the payload or the failure.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiFailure`] when the server reported one.
    pub fn into_data(self) -> Result<T, ApiFailure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}
