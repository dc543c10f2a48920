//! Profile and follow commands
use chirp_core::{Chirp, UserPatch};
use serde::Serialize;

use super::{lines, Output, TweetInfo, UserInfo};

#[derive(Serialize)]
struct ProfilePage {
    user: UserInfo,
    following: bool,
    own: bool,
    tweets: Vec<TweetInfo>,
}

pub async fn profile(chirp: &Chirp, out: &Output, username: &str) -> anyhow::Result<()> {
    let user = chirp.profile(username).await?;
    let tweets = chirp.user_tweets(&user.id).await?;
    let viewer = chirp.session().current_user().map(|u| u.id);

    let page = ProfilePage {
        following: viewer.as_deref().is_some_and(|id| user.is_followed_by(id)),
        own: chirp.is_own_profile(username),
        user: UserInfo::from_user(&user),
        tweets: tweets
            .iter()
            .map(|t| TweetInfo::from_tweet(t, chirp.tweet_like_state(t)))
            .collect(),
    };
    out.emit(&page, |p| {
        let marker = match (p.own, p.following) {
            (true, _) => " (you)",
            (false, true) => " (following)",
            (false, false) => "",
        };
        format!("{}{}\n{}", p.user.line(), marker, lines(&p.tweets, TweetInfo::line))
    })
}

pub async fn follow(chirp: &Chirp, out: &Output, username: &str) -> anyhow::Result<()> {
    if chirp.is_own_profile(username) {
        return out.message("You cannot follow yourself");
    }
    let mut user = chirp.profile(username).await?;
    let state = chirp.toggle_follow(&mut user).await?;
    out.emit(&state, |s| {
        let verb = if s.following { "Following" } else { "Unfollowed" };
        format!("{verb} @{username} ({} followers)", s.followers)
    })
}

pub async fn suggestions(chirp: &Chirp, out: &Output) -> anyhow::Result<()> {
    let users = chirp.suggestions().await?;
    let users: Vec<UserInfo> = users.iter().map(UserInfo::from_user).collect();
    out.emit(&users, |users| lines(users, UserInfo::line))
}

pub async fn edit_profile(chirp: &Chirp, out: &Output, patch: UserPatch) -> anyhow::Result<()> {
    if patch == UserPatch::default() {
        return out.message("Nothing to change");
    }
    let user = chirp.update_profile(patch).await?;
    out.emit(&UserInfo::from_user(&user), UserInfo::line)
}
