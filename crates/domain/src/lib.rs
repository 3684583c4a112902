//! Clipper Domain - Core business types
//!
//! This crate defines the data model shared by the Clipper API client:
//! credentials, the response envelope, request options, session events and
//! the barbershop records the server exposes.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod id;
pub mod request;
pub mod session;
pub mod shop;

pub use auth::{AuthTokens, LoginRequest, RefreshRequest, StoredTokens, TokenPair, User, UserRole};
pub use envelope::{ApiFailure, ApiResponse, Envelope};
pub use error::{DomainError, DomainResult};
pub use id::{EntityId, generate_request_id};
pub use request::{HttpMethod, RequestConfig};
pub use session::{ExpiryReason, SessionEvent};
