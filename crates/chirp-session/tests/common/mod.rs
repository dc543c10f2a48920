//! In-process mock of the Chirp auth endpoints.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose, Engine as _};
use chirp_api::{ApiClient, Credentials};
use chirp_session::SessionManager;
use chirp_storage::Database;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn jwt(claims: Value) -> String {
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2lnbmF0dXJl")
}

/// A token for `u1` expiring `offset_secs` from now.
pub fn token_expiring_in(offset_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + offset_secs;
    jwt(json!({"id": "u1", "iat": exp - 3600, "exp": exp}))
}

pub fn profile() -> Value {
    json!({
        "_id": "u1",
        "name": "Ada Lovelace",
        "username": "ada",
        "email": "ada@example.com",
        "bio": "Analytical",
        "followers": ["u2"],
        "following": []
    })
}

#[derive(Clone, Default)]
pub struct MockApi {
    accepted: Arc<Mutex<HashSet<String>>>,
    login_delay: Option<Duration>,
    profile_delay: Option<Duration>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_delay(delay: Duration) -> Self {
        Self {
            login_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Answer `/users/me` only after `delay`.
    pub fn with_profile_delay(delay: Duration) -> Self {
        Self {
            profile_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make the profile endpoint accept `token`.
    pub fn accept(&self, token: &str) {
        self.accepted.lock().unwrap().insert(token.to_string());
    }

    fn issue(&self) -> String {
        let token = token_expiring_in(3600);
        self.accept(&token);
        token
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.accepted.lock().unwrap().contains(token))
    }

    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/api/users/me", get(me))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local listener should bind");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });
        format!("http://{addr}/api")
    }
}

async fn me(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if let Some(delay) = api.profile_delay {
        tokio::time::sleep(delay).await;
    }
    if api.authorized(&headers) {
        Json(profile()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Token is not valid"})),
        )
            .into_response()
    }
}

async fn login(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    if let Some(delay) = api.login_delay {
        tokio::time::sleep(delay).await;
    }

    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("ada@example.com"), Some("secret")) => {
            Json(json!({"token": api.issue(), "user": profile()})).into_response()
        }
        (Some("crash@example.com"), _) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn register(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    match body["username"].as_str() {
        Some("taken") => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Username already exists"})),
        )
            .into_response(),
        Some("") | None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some(username) => {
            let mut user = profile();
            user["username"] = json!(username);
            user["name"] = body["name"].clone();
            Json(json!({"token": api.issue(), "user": user})).into_response()
        }
    }
}

/// Base URL where nothing is listening.
pub fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/api")
}

pub fn manager(base: &str, db: &Database) -> SessionManager {
    let api = ApiClient::new(base, Credentials::new()).expect("api client");
    SessionManager::new(db.clone(), api)
}
