//! Session error types

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// User-facing login failure: the server message, or "Login failed".
    #[error("{0}")]
    LoginFailed(String),

    /// User-facing registration failure: the server message, or "Registration failed".
    #[error("{0}")]
    RegistrationFailed(String),

    #[error("Session was signed out while the request was in flight")]
    Superseded,

    #[error("Storage error: {0}")]
    Storage(#[from] chirp_storage::StorageError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
}
