//! Outbound credential slot
//!
//! Shared between the session manager (the only writer) and the API client,
//! which reads it each time a request is built.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    /// Returns whether a token was attached.
    pub fn detach(&self) -> bool {
        self.token.write().take().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// The `Authorization` header value the next request would carry.
    pub fn header_value(&self) -> Option<String> {
        self.token
            .read()
            .as_deref()
            .map(|token| format!("Bearer {token}"))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("attached", &self.is_attached())
            .finish()
    }
}
