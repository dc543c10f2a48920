//! Chirp Core
//!
//! Application container for the Chirp client. One [`Chirp`] value owns the
//! database, the API client and the session manager; consumers receive it by
//! handle and read session state from it instead of keeping their own.

mod client;
mod config;
mod error;
mod social;

pub use client::Chirp;
pub use config::Config;
pub use error::CoreError;
pub use social::{toggle_membership, Feed, FeedTab, FollowState, LikeState};

// Re-export core components
pub use chirp_api::{ApiClient, ApiError, AuthResponse, Comment, Credentials, Tweet, User, UserPatch};
pub use chirp_session::{Session, SessionError, SessionManager, SessionState, Token, TokenError};
pub use chirp_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
