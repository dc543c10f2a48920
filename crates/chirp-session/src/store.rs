//! Persisted token slot

use chirp_storage::{Database, Result};

/// Fixed key of the durable slot holding the raw token.
pub const TOKEN_KEY: &str = "token";

/// Read/write access to the persisted token. Only the session manager holds one.
#[derive(Clone)]
pub struct TokenStore {
    db: Database,
}

impl TokenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn load(&self) -> Result<Option<String>> {
        Ok(self
            .db
            .get_setting(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<()> {
        self.db.set_setting(TOKEN_KEY, token)
    }

    /// Returns whether a token was stored.
    pub fn clear(&self) -> Result<bool> {
        self.db.delete_setting(TOKEN_KEY)
    }
}
