//! Clipper Application - API client, session and ports
//!
//! This crate defines the application layer with:
//! - Port traits (transport, token storage, clock, cache, navigation)
//! - The authenticated [`ApiClient`] and its token refresh handling
//! - The [`AuthSession`] manager and typed resource APIs
//! - Application-level error handling

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod resources;

#[cfg(test)]
mod test_support;

pub use auth::{AuthSession, TokenStore};
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use ports::{
    Clock, DataCache, HttpTransport, Navigator, TokenRepository, TokenRepositoryError,
    TransportError, TransportFuture, TransportRequest, TransportResponse,
};
pub use resources::Resources;
