//! HTTP client for the Chirp API

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{parse_error_message, ApiError};
use crate::models::{AuthResponse, Comment, LoginRequest, RegisterRequest, Tweet, User, UserPatch};
use crate::Result;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, None)
    }

    pub fn with_timeout(
        base_url: &str,
        credentials: Credentials,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Every request goes through here so the credential slot is consulted
    /// at build time.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match self.credentials.header_value() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    // === Auth ===

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.send_json(self.request(Method::POST, &["auth", "login"]).json(request))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.send_json(self.request(Method::POST, &["auth", "register"]).json(request))
            .await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.send_json(self.request(Method::GET, &["users", "me"]))
            .await
    }

    // === Users ===

    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        self.send_json(self.request(Method::GET, &["users", username]))
            .await
    }

    pub async fn suggestions(&self) -> Result<Vec<User>> {
        self.send_json(self.request(Method::GET, &["users", "suggestions"]))
            .await
    }

    /// Follow or unfollow, depending on the current server-side relation.
    pub async fn toggle_follow(&self, user_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["users", user_id, "follow"]))
            .await
    }

    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User> {
        let form = patch
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));
        self.send_json(self.request(Method::PUT, &["users"]).multipart(form))
            .await
    }

    // === Tweets ===

    pub async fn tweets(&self) -> Result<Vec<Tweet>> {
        self.send_json(self.request(Method::GET, &["tweets"])).await
    }

    pub async fn timeline(&self) -> Result<Vec<Tweet>> {
        self.send_json(self.request(Method::GET, &["tweets", "timeline"]))
            .await
    }

    pub async fn tweet(&self, tweet_id: &str) -> Result<Tweet> {
        self.send_json(self.request(Method::GET, &["tweets", tweet_id]))
            .await
    }

    pub async fn user_tweets(&self, user_id: &str) -> Result<Vec<Tweet>> {
        self.send_json(self.request(Method::GET, &["tweets", "user", user_id]))
            .await
    }

    pub async fn create_tweet(&self, content: &str) -> Result<Tweet> {
        let form = Form::new().text("content", content.to_string());
        self.send_json(self.request(Method::POST, &["tweets"]).multipart(form))
            .await
    }

    pub async fn delete_tweet(&self, tweet_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["tweets", tweet_id]))
            .await
    }

    pub async fn toggle_tweet_like(&self, tweet_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["tweets", tweet_id, "like"]))
            .await
    }

    // === Comments ===

    pub async fn comments(&self, tweet_id: &str) -> Result<Vec<Comment>> {
        self.send_json(self.request(Method::GET, &["tweets", tweet_id, "comments"]))
            .await
    }

    pub async fn add_comment(&self, tweet_id: &str, content: &str) -> Result<Comment> {
        let body = serde_json::json!({ "content": content });
        self.send_json(
            self.request(Method::POST, &["tweets", tweet_id, "comments"])
                .json(&body),
        )
        .await
    }

    pub async fn toggle_comment_like(&self, comment_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["comments", comment_id, "like"]))
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["comments", comment_id]))
            .await
    }

    // === Transport ===

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(ApiError::Network)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body);
        tracing::debug!(
            status = %status,
            host = self.base_url.host_str().unwrap_or(""),
            message = message.as_deref().unwrap_or(""),
            "Request rejected"
        );

        Err(ApiError::Rejected { status, message })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(format!("{raw}: not a base URL")));
    }

    Ok(url)
}
