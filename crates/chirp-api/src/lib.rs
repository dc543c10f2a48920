//! Chirp API Client
//!
//! Typed HTTP calls against the Chirp REST API. The client holds no session
//! logic of its own: it reads the shared [`Credentials`] slot when each request
//! is built and attaches `Authorization: Bearer <token>` if one is present.

mod client;
mod credentials;
mod error;
mod models;

pub use client::ApiClient;
pub use credentials::Credentials;
pub use error::ApiError;
pub use models::{AuthResponse, Comment, LoginRequest, RegisterRequest, Tweet, User, UserPatch};
pub use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, ApiError>;
