//! Local view state for likes, follows and feeds
//!
//! Counters here only move after the server accepted the change.

use chirp_api::{Tweet, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedTab {
    /// Posts from followed accounts
    #[default]
    ForYou,
    /// Everything, newest first
    Latest,
}

impl FeedTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedTab::ForYou => "forYou",
            FeedTab::Latest => "latest",
        }
    }
}

impl std::str::FromStr for FeedTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foryou" | "for-you" | "timeline" => Ok(FeedTab::ForYou),
            "latest" | "all" => Ok(FeedTab::Latest),
            _ => Err(format!("Unknown feed: {}", s)),
        }
    }
}

/// Like counter and flag for one post or comment, from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LikeState {
    pub count: usize,
    pub liked: bool,
}

impl LikeState {
    pub fn new(likes: &[String], viewer_id: Option<&str>) -> Self {
        Self {
            count: likes.len(),
            liked: viewer_id.is_some_and(|id| likes.iter().any(|l| l == id)),
        }
    }

    pub fn toggle(&mut self) {
        if self.liked {
            self.count = self.count.saturating_sub(1);
        } else {
            self.count += 1;
        }
        self.liked = !self.liked;
    }
}

/// Follow relation between the viewer and a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FollowState {
    pub following: bool,
    pub followers: usize,
}

impl FollowState {
    pub fn new(profile: &User, viewer_id: Option<&str>) -> Self {
        Self {
            following: viewer_id.is_some_and(|id| profile.is_followed_by(id)),
            followers: profile.followers.len(),
        }
    }
}

/// Add `id` to `list` if missing, otherwise remove it. Returns whether it is
/// now a member.
pub fn toggle_membership(list: &mut Vec<String>, id: &str) -> bool {
    if let Some(index) = list.iter().position(|existing| existing == id) {
        list.remove(index);
        false
    } else {
        list.push(id.to_string());
        true
    }
}

/// A loaded feed and its edits since loading.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub tab: FeedTab,
    pub tweets: Vec<Tweet>,
}

impl Feed {
    pub fn new(tab: FeedTab, tweets: Vec<Tweet>) -> Self {
        Self { tab, tweets }
    }

    /// A freshly posted tweet goes on top.
    pub fn prepend(&mut self, tweet: Tweet) {
        self.tweets.insert(0, tweet);
    }

    pub fn replace(&mut self, tweet: Tweet) -> bool {
        match self.tweets.iter_mut().find(|t| t.id == tweet.id) {
            Some(slot) => {
                *slot = tweet;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, tweet_id: &str) -> Option<Tweet> {
        let index = self.tweets.iter().position(|t| t.id == tweet_id)?;
        Some(self.tweets.remove(index))
    }

    pub fn get_mut(&mut self, tweet_id: &str) -> Option<&mut Tweet> {
        self.tweets.iter_mut().find(|t| t.id == tweet_id)
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }
}
