//! Request-side types

mod config;
mod method;

pub use config::{JSON_CONTENT_TYPE, RequestConfig};
pub use method::HttpMethod;
