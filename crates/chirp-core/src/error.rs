//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] chirp_storage::StorageError),

    #[error(transparent)]
    Session(#[from] chirp_session::SessionError),

    #[error("API error: {0}")]
    Api(#[from] chirp_api::ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Tweet cannot be empty")]
    EmptyTweet,

    #[error("Comment cannot be empty")]
    EmptyComment,
}

impl CoreError {
    /// Whether the server rejected the credential, which also ends the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_unauthorized())
    }
}
