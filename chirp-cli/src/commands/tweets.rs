//! Feed, tweet and comment commands
use anyhow::anyhow;
use chirp_core::{Chirp, FeedTab};
use serde::Serialize;

use super::{lines, CommentInfo, Output, TweetInfo};

pub async fn feed(chirp: &Chirp, out: &Output, latest: bool) -> anyhow::Result<()> {
    let tab = if latest { FeedTab::Latest } else { FeedTab::ForYou };
    let feed = chirp.feed(tab).await?;

    let tweets: Vec<TweetInfo> = feed
        .tweets
        .iter()
        .map(|t| TweetInfo::from_tweet(t, chirp.tweet_like_state(t)))
        .collect();
    out.emit(&tweets, |tweets| lines(tweets, TweetInfo::line))
}

#[derive(Serialize)]
struct Thread {
    tweet: TweetInfo,
    comments: Vec<CommentInfo>,
}

pub async fn show(chirp: &Chirp, out: &Output, tweet_id: &str) -> anyhow::Result<()> {
    let tweet = chirp.tweet(tweet_id).await?;
    let comments = chirp.comments(tweet_id).await?;
    let viewer = chirp.session().current_user().map(|u| u.id);

    let thread = Thread {
        tweet: TweetInfo::from_tweet(&tweet, chirp.tweet_like_state(&tweet)),
        comments: comments
            .iter()
            .map(|c| CommentInfo::from_comment(c, viewer.as_deref()))
            .collect(),
    };
    out.emit(&thread, |t| {
        if t.comments.is_empty() {
            t.tweet.line()
        } else {
            format!("{}\n{}", t.tweet.line(), lines(&t.comments, CommentInfo::line))
        }
    })
}

pub async fn post(chirp: &Chirp, out: &Output, content: &str) -> anyhow::Result<()> {
    let tweet = chirp.post_tweet(content).await?;
    let info = TweetInfo::from_tweet(&tweet, chirp.tweet_like_state(&tweet));
    out.emit(&info, TweetInfo::line)
}

pub async fn delete(chirp: &Chirp, out: &Output, tweet_id: &str) -> anyhow::Result<()> {
    let tweet = chirp.tweet(tweet_id).await?;
    if !chirp.is_own_tweet(&tweet) {
        return Err(anyhow!("You can only delete your own tweets"));
    }
    chirp.delete_tweet(tweet_id).await?;
    out.message("Tweet deleted")
}

pub async fn like(chirp: &Chirp, out: &Output, tweet_id: &str) -> anyhow::Result<()> {
    let mut tweet = chirp.tweet(tweet_id).await?;
    let likes = chirp.toggle_tweet_like(&mut tweet).await?;
    out.emit(&likes, |l| {
        let verb = if l.liked { "Liked" } else { "Unliked" };
        format!("{verb} ({} likes)", l.count)
    })
}

pub async fn comment(chirp: &Chirp, out: &Output, tweet_id: &str, content: &str) -> anyhow::Result<()> {
    let comment = chirp.add_comment(tweet_id, content).await?;
    let viewer = chirp.session().current_user().map(|u| u.id);
    let info = CommentInfo::from_comment(&comment, viewer.as_deref());
    out.emit(&info, CommentInfo::line)
}

pub async fn like_comment(
    chirp: &Chirp,
    out: &Output,
    tweet_id: &str,
    comment_id: &str,
) -> anyhow::Result<()> {
    let mut comments = chirp.comments(tweet_id).await?;
    let comment = comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| anyhow!("No comment {comment_id} on tweet {tweet_id}"))?;

    let likes = chirp.toggle_comment_like(comment).await?;
    out.emit(&likes, |l| {
        let verb = if l.liked { "Liked" } else { "Unliked" };
        format!("{verb} comment ({} likes)", l.count)
    })
}

pub async fn delete_comment(chirp: &Chirp, out: &Output, comment_id: &str) -> anyhow::Result<()> {
    chirp.delete_comment(comment_id).await?;
    out.message("Comment deleted")
}
