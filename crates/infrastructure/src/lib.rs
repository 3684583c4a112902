//! Clipper Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod persistence;

pub use adapters::{ReqwestTransport, SystemClock};
pub use bootstrap::ClipperServices;
pub use cache::MokaQueryCache;
pub use self::config::{ClientConfig, ConfigError};
pub use persistence::FileTokenRepository;
