//! Main client state container
//!
//! All session state flows through the [`SessionManager`] held here; the
//! social calls below read the signed-in user from it and end the session
//! when the server answers 401.

use chirp_api::{ApiClient, Comment, Credentials, Tweet, User, UserPatch};
use chirp_session::{Session, SessionManager};
use chirp_storage::Database;

use crate::config::Config;
use crate::error::CoreError;
use crate::social::{toggle_membership, Feed, FeedTab, FollowState, LikeState};
use crate::Result;

/// Main client instance
pub struct Chirp {
    /// Configuration
    config: Config,
    /// API client, sharing its credential slot with the session manager
    api: ApiClient,
    /// Session manager
    session: SessionManager,
}

impl Chirp {
    /// Open the configured database and build the client.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let api = ApiClient::with_timeout(&config.api_url, Credentials::new(), config.request_timeout)?;
        let session = SessionManager::new(db, api.clone());

        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// Restore the persisted session. Call once at startup.
    pub async fn initialize(&self) -> Session {
        let session = self.session.restore().await;
        tracing::info!(
            state = %session.state(),
            api_url = %self.config.api_url,
            "Client initialized"
        );
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn viewer(&self) -> Result<User> {
        self.session.current_user().ok_or(CoreError::NotAuthenticated)
    }

    fn viewer_id(&self) -> Option<String> {
        self.session.current_user().map(|u| u.id)
    }

    /// Map an API result, ending the session if the credential was refused.
    fn checked<T>(&self, result: chirp_api::Result<T>) -> Result<T> {
        result.map_err(|e| {
            if e.is_unauthorized() && self.session.is_authenticated() {
                self.session.invalidate("request rejected with 401");
            }
            CoreError::Api(e)
        })
    }

    // === Feed and tweets ===

    pub async fn feed(&self, tab: FeedTab) -> Result<Feed> {
        let tweets = match tab {
            FeedTab::ForYou => self.api.timeline().await,
            FeedTab::Latest => self.api.tweets().await,
        };
        let tweets = self.checked(tweets)?;
        tracing::debug!(feed = tab.as_str(), count = tweets.len(), "Loaded feed");
        Ok(Feed::new(tab, tweets))
    }

    pub async fn tweet(&self, tweet_id: &str) -> Result<Tweet> {
        let result = self.api.tweet(tweet_id).await;
        self.checked(result)
    }

    pub async fn user_tweets(&self, user_id: &str) -> Result<Vec<Tweet>> {
        let result = self.api.user_tweets(user_id).await;
        self.checked(result)
    }

    pub async fn post_tweet(&self, content: &str) -> Result<Tweet> {
        if content.trim().is_empty() {
            return Err(CoreError::EmptyTweet);
        }
        self.viewer()?;

        let result = self.api.create_tweet(content).await;
        let tweet = self.checked(result)?;
        tracing::info!(tweet_id = %tweet.id, "Posted tweet");
        Ok(tweet)
    }

    pub async fn delete_tweet(&self, tweet_id: &str) -> Result<()> {
        self.viewer()?;
        let result = self.api.delete_tweet(tweet_id).await;
        self.checked(result)?;
        tracing::info!(tweet_id = %tweet_id, "Deleted tweet");
        Ok(())
    }

    /// Like or unlike; the tweet's like list is updated once the server agrees.
    pub async fn toggle_tweet_like(&self, tweet: &mut Tweet) -> Result<LikeState> {
        let viewer = self.viewer()?;
        let result = self.api.toggle_tweet_like(&tweet.id).await;
        self.checked(result)?;

        toggle_membership(&mut tweet.likes, &viewer.id);
        Ok(LikeState::new(&tweet.likes, Some(&viewer.id)))
    }

    pub fn tweet_like_state(&self, tweet: &Tweet) -> LikeState {
        LikeState::new(&tweet.likes, self.viewer_id().as_deref())
    }

    pub fn is_own_tweet(&self, tweet: &Tweet) -> bool {
        self.viewer_id().is_some_and(|id| id == tweet.user.id)
    }

    // === Comments ===

    pub async fn comments(&self, tweet_id: &str) -> Result<Vec<Comment>> {
        let result = self.api.comments(tweet_id).await;
        self.checked(result)
    }

    pub async fn add_comment(&self, tweet_id: &str, content: &str) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(CoreError::EmptyComment);
        }
        self.viewer()?;

        let result = self.api.add_comment(tweet_id, content).await;
        let comment = self.checked(result)?;
        tracing::info!(tweet_id = %tweet_id, comment_id = %comment.id, "Added comment");
        Ok(comment)
    }

    pub async fn toggle_comment_like(&self, comment: &mut Comment) -> Result<LikeState> {
        let viewer = self.viewer()?;
        let result = self.api.toggle_comment_like(&comment.id).await;
        self.checked(result)?;

        toggle_membership(&mut comment.likes, &viewer.id);
        Ok(LikeState::new(&comment.likes, Some(&viewer.id)))
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.viewer()?;
        let result = self.api.delete_comment(comment_id).await;
        self.checked(result)
    }

    // === Users ===

    pub async fn profile(&self, username: &str) -> Result<User> {
        let result = self.api.user_by_username(username).await;
        self.checked(result)
    }

    pub fn is_own_profile(&self, username: &str) -> bool {
        self.session
            .current_user()
            .is_some_and(|u| u.username == username)
    }

    pub async fn suggestions(&self) -> Result<Vec<User>> {
        let result = self.api.suggestions().await;
        self.checked(result)
    }

    /// Follow or unfollow `profile`; its follower list is updated once the
    /// server agrees.
    pub async fn toggle_follow(&self, profile: &mut User) -> Result<FollowState> {
        let viewer = self.viewer()?;
        let result = self.api.toggle_follow(&profile.id).await;
        self.checked(result)?;

        let following = toggle_membership(&mut profile.followers, &viewer.id);
        tracing::info!(
            user_id = %profile.id,
            following,
            "Updated follow"
        );
        Ok(FollowState::new(profile, Some(&viewer.id)))
    }

    /// Follow someone from the suggestion list and drop them from it.
    pub async fn follow_suggested(&self, user_id: &str, suggestions: &mut Vec<User>) -> Result<()> {
        self.viewer()?;
        let result = self.api.toggle_follow(user_id).await;
        self.checked(result)?;
        suggestions.retain(|u| u.id != user_id);
        Ok(())
    }

    /// Send a profile edit and fold the server's copy into the session.
    pub async fn update_profile(&self, patch: UserPatch) -> Result<User> {
        self.viewer()?;
        let result = self.api.update_profile(&patch).await;
        let updated = self.checked(result)?;

        let merged = self
            .session
            .update_user(UserPatch::from_user(&updated))
            .unwrap_or_else(|| updated.clone());
        tracing::info!(user_id = %merged.id, "Updated profile");
        Ok(merged)
    }
}
