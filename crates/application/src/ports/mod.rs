//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod data_cache;
mod navigator;
mod token_repository;
mod transport;

pub use clock::Clock;
pub use data_cache::DataCache;
pub use navigator::Navigator;
pub use token_repository::{TokenRepository, TokenRepositoryError};
pub use transport::{
    HttpTransport, TransportError, TransportFuture, TransportRequest, TransportResponse,
};
