//! Request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user profile as returned by the API.
///
/// Only `id` and `username` carry meaning for the client; everything else is
/// passed through. Unknown fields are kept in `extra`, including an `id`
/// virtual the server may send next to `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(website) = patch.website {
            self.website = Some(website);
        }
        if let Some(profile_picture) = patch.profile_picture {
            self.profile_picture = Some(profile_picture);
        }
        if let Some(cover_photo) = patch.cover_photo {
            self.cover_photo = Some(cover_photo);
        }
        self.extra.extend(patch.extra);
    }

    pub fn is_followed_by(&self, user_id: &str) -> bool {
        self.followers.iter().any(|id| id == user_id)
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPatch {
    pub fn bio(bio: impl Into<String>) -> Self {
        Self {
            bio: Some(bio.into()),
            ..Self::default()
        }
    }

    /// Text form fields for the multipart profile update.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        let named = [
            ("name", &self.name),
            ("bio", &self.bio),
            ("location", &self.location),
            ("website", &self.website),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                fields.push((key.to_string(), value.clone()));
            }
        }
        for (key, value) in &self.extra {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            fields.push((key.clone(), text));
        }
        fields
    }

    /// A patch built from a full profile, used to fold a server reply back
    /// into the session. A reply without a name keeps the current one.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: (!user.name.is_empty()).then(|| user.name.clone()),
            bio: user.bio.clone(),
            location: user.location.clone(),
            website: user.website.clone(),
            profile_picture: user.profile_picture.clone(),
            cover_photo: user.cover_photo.clone(),
            extra: user.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Reply of both `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub user: User,
    #[serde(default)]
    pub likes: Vec<String>,
    /// Comment ids or embedded comments, depending on the endpoint.
    #[serde(default)]
    pub comments: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub user: User,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        serde_json::from_value(json!({
            "_id": "u1",
            "name": "Ada",
            "username": "ada",
            "bio": "old",
            "followers": ["u2"],
            "createdAt": "2024-03-01T10:00:00.000Z",
            "verified": true
        }))
        .unwrap()
    }

    #[test]
    fn test_user_accepts_mongo_ids_and_keeps_unknown_fields() {
        let user = sample_user();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "ada");
        assert_eq!(user.extra.get("verified"), Some(&json!(true)));
        assert!(user.is_followed_by("u2"));
        assert!(!user.is_followed_by("u3"));

        let plain: User = serde_json::from_value(json!({"_id": "u9"})).unwrap();
        assert_eq!(plain.id, "u9");
        assert!(plain.followers.is_empty());
    }

    #[test]
    fn test_id_virtual_next_to_mongo_id() {
        let user: User =
            serde_json::from_value(json!({"_id": "u1", "id": "u1", "username": "ada"})).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "ada");
        assert_eq!(user.extra.get("id"), Some(&json!("u1")));

        let tweet: Tweet = serde_json::from_value(json!({
            "_id": "t1",
            "id": "t1",
            "content": "hi",
            "user": {"_id": "u1", "id": "u1", "username": "ada"}
        }))
        .unwrap();
        assert_eq!(tweet.id, "t1");
        assert_eq!(tweet.user.id, "u1");

        let comment: Comment = serde_json::from_value(json!({
            "_id": "c1",
            "id": "c1",
            "content": "nice",
            "user": {"_id": "u2", "id": "u2"}
        }))
        .unwrap();
        assert_eq!(comment.id, "c1");
    }

    #[test]
    fn test_patch_from_nameless_reply_keeps_name() {
        let mut user = sample_user();
        let reply: User =
            serde_json::from_value(json!({"_id": "u1", "username": "ada", "bio": "new"})).unwrap();
        user.merge(UserPatch::from_user(&reply));

        assert_eq!(user.name, "Ada");
        assert_eq!(user.bio.as_deref(), Some("new"));
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut user = sample_user();
        user.merge(UserPatch::bio("x"));

        assert_eq!(user.bio.as_deref(), Some("x"));
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "ada");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.followers, vec!["u2".to_string()]);
    }

    #[test]
    fn test_merge_extra_fields() {
        let mut user = sample_user();
        let mut patch = UserPatch::default();
        patch.extra.insert("theme".to_string(), json!("dark"));
        user.merge(patch);
        assert_eq!(user.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(user.extra.get("verified"), Some(&json!(true)));
    }

    #[test]
    fn test_patch_form_fields() {
        let mut patch = UserPatch {
            name: Some("Ada L".to_string()),
            website: Some("https://ada.dev".to_string()),
            ..UserPatch::default()
        };
        patch.extra.insert("age".to_string(), json!(36));
        patch.extra.insert("nothing".to_string(), Value::Null);

        let fields = patch.form_fields();
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), "Ada L".to_string()),
                ("website".to_string(), "https://ada.dev".to_string()),
                ("age".to_string(), "36".to_string()),
            ]
        );
    }

    #[test]
    fn test_tweet_with_populated_author() {
        let tweet: Tweet = serde_json::from_value(json!({
            "_id": "t1",
            "content": "hello",
            "user": {"_id": "u1", "name": "Ada", "username": "ada"},
            "likes": ["u2", "u3"],
            "comments": ["c1"]
        }))
        .unwrap();
        assert_eq!(tweet.user.username, "ada");
        assert_eq!(tweet.likes.len(), 2);
        assert_eq!(tweet.comments.len(), 1);
        assert!(tweet.image.is_none());
    }
}
