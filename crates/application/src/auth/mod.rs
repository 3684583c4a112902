//! Authentication state
//!
//! - [`TokenStore`]: the credential pair with its local expiry
//! - [`AuthSession`]: login, logout and the signed-in account

mod session;
mod token_store;

pub use session::AuthSession;
pub use token_store::TokenStore;
