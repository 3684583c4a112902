//! API client
//!
//! Request execution, response decoding and the single-flight refresh of
//! expired credentials.

mod api_client;
mod refresh;

pub use api_client::{ApiClient, LOGIN_ENDPOINT, ME_ENDPOINT, REFRESH_ENDPOINT};
