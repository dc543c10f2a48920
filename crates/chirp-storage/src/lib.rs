//! Chirp Storage Layer
//!
//! SQLite-backed durable key-value slots. The session crate keeps the bearer
//! token here so it survives process restarts.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
