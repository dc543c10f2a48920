//! In-process mock of the Chirp REST API.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::{engine::general_purpose, Engine as _};
use chirp_core::{Chirp, Config, Database};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret";

fn jwt() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let claims = json!({"id": "u1", "iat": exp - 3600, "exp": exp});
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2lnbmF0dXJl")
}

fn user(id: &str, username: &str, followers: &[&str]) -> Value {
    json!({
        "_id": id,
        "name": username.to_uppercase(),
        "username": username,
        "followers": followers,
        "following": []
    })
}

pub fn ada() -> Value {
    let mut ada = user("u1", "ada", &["u2"]);
    ada["bio"] = json!("Analytical");
    ada
}

fn tweet(id: &str, content: &str, author: Value, likes: &[&str]) -> Value {
    json!({
        "_id": id,
        "content": content,
        "user": author,
        "likes": likes,
        "comments": [],
        "createdAt": "2024-05-01T12:00:00Z"
    })
}

/// Value of a text field in a multipart body.
fn form_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"\r\n\r\n");
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    let end = rest.find("\r\n")?;
    Some(rest[..end].to_string())
}

#[derive(Clone, Default)]
pub struct MockApi {
    accepted: Arc<Mutex<HashSet<String>>>,
    revoked: Arc<AtomicBool>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// From now on every authenticated route answers 401.
    pub fn revoke_all(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.revoked.load(Ordering::SeqCst) {
            return false;
        }
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.accepted.lock().unwrap().contains(token))
    }

    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/users", put(update_profile))
            .route("/api/users/me", get(me))
            .route("/api/users/suggestions", get(suggestions))
            .route("/api/users/:id", get(profile))
            .route("/api/users/:id/follow", post(authed_ok))
            .route("/api/tweets", get(all_tweets).post(create_tweet))
            .route("/api/tweets/timeline", get(timeline))
            .route("/api/tweets/:id", get(one_tweet).delete(authed_ok))
            .route("/api/tweets/:id/like", post(authed_ok))
            .route("/api/tweets/:id/comments", get(comments).post(add_comment))
            .route("/api/comments/:id", axum::routing::delete(authed_ok))
            .route("/api/comments/:id/like", post(authed_ok))
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

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token is not valid"})),
    )
        .into_response()
}

async fn login(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        let token = jwt();
        api.accepted.lock().unwrap().insert(token.clone());
        Json(json!({"token": token, "user": ada()})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn me(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    Json(ada()).into_response()
}

async fn suggestions(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    Json(json!([user("u3", "grace", &[]), user("u4", "linus", &[])])).into_response()
}

async fn profile(Path(username): Path<String>) -> Response {
    match username.as_str() {
        "grace" => Json(user("u3", "grace", &["u2"])).into_response(),
        "ada" => Json(ada()).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        )
            .into_response(),
    }
}

async fn update_profile(State(api): State<MockApi>, headers: HeaderMap, body: String) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    let mut updated = ada();
    if let Some(bio) = form_field(&body, "bio") {
        updated["bio"] = json!(bio);
    }
    if let Some(location) = form_field(&body, "location") {
        updated["location"] = json!(location);
    }
    Json(updated).into_response()
}

async fn authed_ok(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"message": "ok"})).into_response()
}

async fn all_tweets() -> Response {
    Json(json!([
        tweet("t2", "second", user("u3", "grace", &[]), &[]),
        tweet("t1", "first", ada(), &["u3"]),
    ]))
    .into_response()
}

async fn timeline(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    Json(json!([tweet("t2", "second", user("u3", "grace", &[]), &[])])).into_response()
}

async fn one_tweet(Path(id): Path<String>) -> Response {
    if id == "t1" {
        Json(tweet("t1", "first", ada(), &["u3"])).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Tweet not found"})),
        )
            .into_response()
    }
}

async fn create_tweet(State(api): State<MockApi>, headers: HeaderMap, body: String) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    let content = form_field(&body, "content").unwrap_or_default();
    (StatusCode::CREATED, Json(tweet("t9", &content, ada(), &[]))).into_response()
}

async fn comments(Path(tweet_id): Path<String>) -> Response {
    Json(json!([{
        "_id": format!("{tweet_id}-c1"),
        "content": "nice",
        "user": user("u3", "grace", &[]),
        "likes": []
    }]))
    .into_response()
}

async fn add_comment(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(tweet_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "_id": format!("{tweet_id}-c2"),
            "content": body["content"],
            "user": ada(),
            "likes": []
        })),
    )
        .into_response()
}

/// Base URL where nothing is listening.
pub fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/api")
}

pub fn config(base: &str) -> Config {
    let mut config = Config::new(std::env::temp_dir().join("chirp-core-tests"));
    config.api_url = base.to_string();
    config
}

pub async fn client(base: &str) -> Chirp {
    let db = Database::open_in_memory().expect("in-memory database");
    let chirp = Chirp::with_database(config(base), db).expect("client");
    chirp.initialize().await;
    chirp
}

pub async fn signed_in(base: &str) -> Chirp {
    let chirp = client(base).await;
    chirp
        .session()
        .login(EMAIL, PASSWORD)
        .await
        .expect("login should succeed");
    chirp
}
