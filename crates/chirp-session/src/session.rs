//! Session snapshot and state machine
//!
//! ```text
//! Initializing --restore--> Authenticated
//!      |                        ^   |
//!      | restore        login / |   | logout / invalidate
//!      v               register |   v
//! Unauthenticated <-------------+---+
//! ```

use chirp_api::User;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Persisted credentials are being restored
    Initializing,
    /// No valid credential
    Unauthenticated,
    /// Token valid and profile loaded
    Authenticated,
}

impl SessionState {
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            // Nothing re-enters restoration
            (_, SessionState::Initializing) => *self == SessionState::Initializing,
            _ => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One consistent view of the session. Consumers branch on a single snapshot
/// so `is_loading` and `is_authenticated` are never read from different moments.
#[derive(Clone, PartialEq, Serialize)]
pub struct Session {
    #[serde(skip)]
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Session {
    /// The state at process start, before restoration has run.
    pub fn initializing() -> Self {
        Self {
            token: None,
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated {
            SessionState::Authenticated
        } else if self.is_loading {
            SessionState::Initializing
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub(crate) fn establish(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.is_authenticated = true;
    }

    pub(crate) fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("has_token", &self.token.is_some())
            .field("user_id", &self.user_id())
            .field("is_loading", &self.is_loading)
            .finish()
    }
}
