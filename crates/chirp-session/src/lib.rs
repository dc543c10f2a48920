//! Chirp Session Management
//!
//! Single source of truth for who is logged in:
//! - The bearer token is persisted in the storage `settings` slot `"token"`
//! - On startup the persisted token is decoded locally and checked for expiry
//!   before the profile is fetched
//! - The token is attached to outbound requests through the shared
//!   [`chirp_api::Credentials`] slot, never through global client state
//! - Consumers read whole [`Session`] snapshots so the loading and
//!   authenticated flags are always observed together

mod error;
mod manager;
mod session;
mod store;
mod token;

pub use error::{SessionError, TokenError};
pub use manager::SessionManager;
pub use session::{Session, SessionState};
pub use store::{TokenStore, TOKEN_KEY};
pub use token::{Claims, Token};

pub type Result<T> = std::result::Result<T, SessionError>;
