//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] trellis_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailInUse,

    /// The provider did not answer within the request timeout.
    #[error("auth request timed out")]
    Timeout,

    /// Transport-level failure reaching the provider.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Any other failure reason reported by the provider, verbatim.
    #[error("auth provider error: {0}")]
    Provider(String),
}
