//! Per-call request options.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::HttpMethod;

/// Default content type for request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Options recognised by the API client for a single call.
///
/// `skip_auth` suppresses the bearer header and the 401-triggered refresh;
/// it is used for the login and refresh endpoints themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// HTTP method, GET when unset.
    pub method: HttpMethod,
    /// Caller-supplied headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Send without credentials and never refresh.
    pub skip_auth: bool,
}

impl RequestConfig {
    /// Creates a config for the given method with no body.
    #[must_use]
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Sets the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets an already-built JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header, replacing any previous value under the same name in
    /// any casing.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Marks the call as unauthenticated.
    #[must_use]
    pub const fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Returns true if the caller set `name` (case-insensitive).
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|h| h.eq_ignore_ascii_case(name))
    }
}
