//! HTTP transport port
//!
//! The API client builds fully resolved requests and hands them to an
//! [`HttpTransport`]. Status codes are data here, not errors: only failures
//! to get any response at all are reported as [`TransportError`].

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use clipper_domain::HttpMethod;
use thiserror::Error;

/// A request ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Returns the first value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as received.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercase names.
    pub headers: HashMap<String, String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with a body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Returns true for 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Failures to obtain a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No response within the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Host name did not resolve.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Connection could not be established for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Port for sending HTTP requests.
///
/// This trait abstracts the HTTP library, allowing the application layer to
/// be tested against scripted servers.
pub trait HttpTransport: Send + Sync {
    /// Sends one request and returns whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}
