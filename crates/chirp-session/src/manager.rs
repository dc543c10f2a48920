//! Session Manager
//!
//! Owns the persisted token and the credential slot, and publishes
//! [`Session`] snapshots over a watch channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chirp_api::{ApiClient, ApiError, AuthResponse, LoginRequest, RegisterRequest, User, UserPatch};
use chirp_storage::{Database, StorageError};
use tokio::sync::watch;

use crate::error::{SessionError, TokenError};
use crate::session::{Session, SessionState};
use crate::store::TokenStore;
use crate::token::Token;
use crate::Result;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Why a persisted token could not be turned back into a session.
#[derive(Debug)]
enum RestoreFailure {
    Storage(StorageError),
    Token(TokenError),
    Profile(ApiError),
}

impl RestoreFailure {
    fn kind(&self) -> &'static str {
        match self {
            RestoreFailure::Storage(_) => "storage",
            RestoreFailure::Token(TokenError::Malformed(_)) => "malformed_token",
            RestoreFailure::Token(TokenError::Expired { .. }) => "expired_token",
            RestoreFailure::Profile(e) => e.kind(),
        }
    }
}

impl std::fmt::Display for RestoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreFailure::Storage(e) => write!(f, "{e}"),
            RestoreFailure::Token(e) => write!(f, "{e}"),
            RestoreFailure::Profile(e) => write!(f, "{e}"),
        }
    }
}

pub struct SessionManager {
    /// Current snapshot, shared with subscribers
    state: Arc<watch::Sender<Session>>,
    /// Set once restoration has been claimed by a caller
    restore_started: Arc<AtomicBool>,
    /// Bumped on every sign-in or sign-out; restoration yields to newer results
    generation: Arc<AtomicU64>,
    /// Bumped on sign-out only; in-flight sign-ins are dropped when it moves
    signout_generation: Arc<AtomicU64>,
    /// Durable token slot
    store: TokenStore,
    /// API client sharing the credential slot
    api: ApiClient,
}

impl SessionManager {
    pub fn new(db: Database, api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::initializing());

        Self {
            state: Arc::new(state),
            restore_started: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            signout_generation: Arc::new(AtomicU64::new(0)),
            store: TokenStore::new(db),
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // === Snapshots ===

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Resolves once restoration has finished, with the snapshot at that moment.
    pub async fn wait_until_ready(&self) -> Session {
        let mut rx = self.subscribe();
        let ready = rx.wait_for(|session| !session.is_loading).await;
        match ready {
            Ok(session) => session.clone(),
            // The sender lives as long as `self`, so the channel cannot close here
            Err(_) => self.snapshot(),
        }
    }

    // === Restoration ===

    /// Re-establish the session from the persisted token.
    ///
    /// Never fails: every problem degrades to an unauthenticated session. Only
    /// the first call does any work; later calls wait for it and return the
    /// resulting snapshot.
    pub async fn restore(&self) -> Session {
        if self.restore_started.swap(true, Ordering::SeqCst) {
            return self.wait_until_ready().await;
        }

        let generation = self.generation.load(Ordering::SeqCst);

        match self.restore_token().await {
            Ok(None) => {
                tracing::debug!("No persisted token");
                self.finish_loading(|_| {});
            }
            Ok(Some((token, user))) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!("Restored session superseded by a newer sign-in or sign-out");
                    self.finish_loading(|_| {});
                } else {
                    tracing::info!(
                        user_id = %user.id,
                        username = %user.username,
                        "Restored session"
                    );
                    self.finish_loading(|session| session.establish(token, user));
                }
            }
            Err(failure) => {
                tracing::warn!(
                    kind = failure.kind(),
                    error = %failure,
                    "Could not restore session; continuing signed out"
                );
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.discard_credentials();
                    self.finish_loading(Session::clear);
                } else {
                    self.finish_loading(|_| {});
                }
            }
        }

        self.snapshot()
    }

    async fn restore_token(&self) -> std::result::Result<Option<(String, User)>, RestoreFailure> {
        let Some(raw) = self.store.load().map_err(RestoreFailure::Storage)? else {
            return Ok(None);
        };

        let token = Token::decode_valid(&raw).map_err(RestoreFailure::Token)?;

        self.api.credentials().attach(token.as_str());
        let user = self
            .api
            .current_user()
            .await
            .map_err(RestoreFailure::Profile)?;

        Ok(Some((token.as_str().to_string(), user)))
    }

    fn finish_loading(&self, apply: impl FnOnce(&mut Session)) {
        self.state.send_modify(|session| {
            apply(session);
            session.is_loading = false;
        });
    }

    // === Sign-in ===

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let signout_generation = self.signout_generation.load(Ordering::SeqCst);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.api.login(&request).await.map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, "Login failed");
            SessionError::LoginFailed(user_message(&e, LOGIN_FAILED))
        })?;

        self.establish(signout_generation, &response)?;
        Ok(response)
    }

    pub async fn register(
        &self,
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let signout_generation = self.signout_generation.load(Ordering::SeqCst);
        let request = RegisterRequest {
            name: name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.api.register(&request).await.map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, "Registration failed");
            SessionError::RegistrationFailed(user_message(&e, REGISTRATION_FAILED))
        })?;

        self.establish(signout_generation, &response)?;
        Ok(response)
    }

    /// Persist, attach and publish a freshly issued token. Nothing changes
    /// if a sign-out happened after the request was sent.
    fn establish(&self, signout_generation: u64, response: &AuthResponse) -> Result<()> {
        if self.signout_generation.load(Ordering::SeqCst) != signout_generation {
            tracing::info!("Discarding sign-in that completed after sign-out");
            return Err(SessionError::Superseded);
        }

        self.store.save(&response.token)?;
        self.api.credentials().attach(&response.token);
        self.generation.fetch_add(1, Ordering::SeqCst);

        let from = self.state();
        debug_assert!(from.can_transition_to(SessionState::Authenticated));
        self.state.send_modify(|session| {
            session.establish(response.token.clone(), response.user.clone())
        });

        tracing::info!(
            user_id = %response.user.id,
            username = %response.user.username,
            from = %from,
            "Signed in"
        );
        Ok(())
    }

    // === Sign-out ===

    /// Erase the persisted token and drop the session. Always succeeds
    /// locally; calling it again is harmless.
    pub fn logout(&self) {
        self.end_session();
        tracing::info!("Signed out");
    }

    /// Drop a session the server no longer accepts, e.g. after a 401 on an
    /// authenticated call.
    pub fn invalidate(&self, reason: &str) {
        if !self.is_authenticated() {
            return;
        }
        self.end_session();
        tracing::warn!(reason = %reason, "Session invalidated");
    }

    fn end_session(&self) {
        self.signout_generation.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.discard_credentials();
        self.state.send_if_modified(|session| {
            let changed = session.token.is_some() || session.user.is_some();
            session.clear();
            changed
        });
    }

    fn discard_credentials(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to erase persisted token");
        }
        self.api.credentials().detach();
    }

    // === Profile ===

    /// Shallow-merge `patch` into the signed-in user. Returns the merged
    /// user, or `None` when nobody is signed in.
    pub fn update_user(&self, patch: UserPatch) -> Option<User> {
        let mut updated = None;
        self.state.send_if_modified(|session| {
            if !session.is_authenticated {
                return false;
            }
            match session.user.as_mut() {
                Some(user) => {
                    user.merge(patch);
                    updated = Some(user.clone());
                    true
                }
                None => false,
            }
        });

        if updated.is_none() {
            tracing::debug!("update_user ignored without a session");
        }
        updated
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            restore_started: Arc::clone(&self.restore_started),
            generation: Arc::clone(&self.generation),
            signout_generation: Arc::clone(&self.signout_generation),
            store: self.store.clone(),
            api: self.api.clone(),
        }
    }
}

fn user_message(error: &ApiError, fallback: &str) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
