//! Durable local state

mod token_file;

pub use token_file::{FileTokenRepository, SESSION_FILE};
