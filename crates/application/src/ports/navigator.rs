//! Navigation port

/// Sends the user to the sign-in entry point.
///
/// The transport never calls this; only the session manager does, after it
/// has cleared local state.
pub trait Navigator: Send + Sync {
    /// Show the login entry point.
    fn to_login(&self);
}
