//! Authentication domain types

mod types;

pub use types::{
    AuthTokens, LoginRequest, RefreshRequest, StoredTokens, TOKEN_TTL_DAYS, TokenPair, User,
    UserRole, bearer, token_preview,
};
