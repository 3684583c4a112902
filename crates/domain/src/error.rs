//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while interpreting API data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A successful envelope carried no `data` and the payload type needs one.
    #[error("response envelope has no data")]
    MissingData,

    /// The envelope payload could not be decoded into the expected type.
    #[error("invalid envelope payload: {0}")]
    InvalidPayload(String),

    /// An unknown user role was received.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
