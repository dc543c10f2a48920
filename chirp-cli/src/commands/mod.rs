//! Command handlers
//!
//! Each handler talks to [`Chirp`](chirp_core::Chirp) and prints through
//! [`Output`]; none of them keep session state of their own.

pub mod auth;
pub mod tweets;
pub mod users;

use chirp_core::{Comment, LikeState, Tweet, User};
use serde::Serialize;

/// Text or JSON printer chosen by `--json`.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }

    pub fn message(&self, text: &str) -> anyhow::Result<()> {
        self.emit(&serde_json::json!({ "message": text }), |_| text.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub followers: usize,
    pub following: usize,
}

impl UserInfo {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            bio: user.bio.clone(),
            followers: user.followers.len(),
            following: user.following.len(),
        }
    }

    pub fn line(&self) -> String {
        let mut line = format!(
            "{} (@{})  {} followers, {} following",
            self.name, self.username, self.followers, self.following
        );
        if let Some(bio) = &self.bio {
            line.push_str("\n  ");
            line.push_str(bio);
        }
        line
    }
}

#[derive(Debug, Serialize)]
pub struct TweetInfo {
    pub id: String,
    pub author: String,
    pub content: String,
    pub likes: LikeState,
    pub comments: usize,
}

impl TweetInfo {
    pub fn from_tweet(tweet: &Tweet, likes: LikeState) -> Self {
        Self {
            id: tweet.id.clone(),
            author: tweet.user.username.clone(),
            content: tweet.content.clone(),
            likes,
            comments: tweet.comments.len(),
        }
    }

    pub fn line(&self) -> String {
        format!(
            "[{}] @{}: {}\n  {} {} likes, {} comments",
            self.id,
            self.author,
            self.content,
            if self.likes.liked { "*" } else { " " },
            self.likes.count,
            self.comments
        )
    }
}

#[derive(Debug, Serialize)]
pub struct CommentInfo {
    pub id: String,
    pub author: String,
    pub content: String,
    pub likes: LikeState,
}

impl CommentInfo {
    pub fn from_comment(comment: &Comment, viewer_id: Option<&str>) -> Self {
        Self {
            id: comment.id.clone(),
            author: comment.user.username.clone(),
            content: comment.content.clone(),
            likes: LikeState::new(&comment.likes, viewer_id),
        }
    }

    pub fn line(&self) -> String {
        format!(
            "  [{}] @{}: {} ({} likes)",
            self.id, self.author, self.content, self.likes.count
        )
    }
}

pub fn lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(nothing here)".to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}
