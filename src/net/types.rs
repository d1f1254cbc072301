//! Typed entities exchanged with the blog backend.
//!
//! DESIGN
//! ======
//! Responses are parsed into these types at the API boundary. Anything that
//! does not fit is rejected as a malformed response instead of leaking
//! half-populated values into page state.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// An authenticated account as returned by `POST /api/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend row identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    /// Display name.
    pub name: String,
    pub email: String,
    /// Public handle, when the account has one.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl User {
    /// Initials shown in the avatar: first letter of each word, upper-cased.
    #[must_use]
    pub fn initials(&self) -> String {
        initials(&self.name)
    }

    /// Label used for the profile link: username when present, else name.
    #[must_use]
    pub fn handle(&self) -> &str {
        self.username.as_deref().filter(|u| !u.is_empty()).unwrap_or(&self.name)
    }

    /// Author view of this user, as attached to locally appended comments.
    #[must_use]
    pub fn as_author(&self) -> Author {
        Author { id: Some(self.id), name: Some(self.name.clone()), username: self.username.clone() }
    }
}

/// The user embedded in posts and comments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Author {
    /// Name, then username, then `"Anonymous"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.username.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or("Anonymous")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

/// A published post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Storage-relative media path, resolved with [`media_url`].
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Owner of the post; compared against the session user for ownership.
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: i64,
    #[serde(default)]
    pub user: Option<Author>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Post {
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str()).filter(|n| !n.is_empty())
    }

    #[must_use]
    pub fn author_name(&self) -> &str {
        self.user.as_ref().map_or("Anonymous", Author::display_name)
    }

    #[must_use]
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id == user.id
    }
}

/// `GET /api/posts/{id}` payload: the post plus its comments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub user: Option<Author>,
}

/// Body of `POST /api/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Profile submitted to `POST /api/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// A media file attached to a new post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of the multipart `POST /api/posts` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub media: Option<MediaUpload>,
}

/// Body of `POST /api/posts/{id}/comments`.
#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    pub content: &'a str,
}

/// Resolve a stored media path against the public storage URL.
/// Blank paths have no URL.
#[must_use]
pub fn media_url(storage_url: &str, media: Option<&str>) -> Option<String> {
    let media = media.map(str::trim).filter(|m| !m.is_empty())?;
    Some(format!("{}/{}", storage_url.trim_end_matches('/'), media.trim_start_matches('/')))
}

pub(crate) fn initials(name: &str) -> String {
    name.split_whitespace().filter_map(|word| word.chars().next()).flat_map(char::to_uppercase).collect()
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(&value).map_err(D::Error::custom)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    id_from_value(&value).map(Some).map_err(D::Error::custom)
}

// Some backends serialize integer keys as strings; accept both.
fn id_from_value(value: &serde_json::Value) -> Result<i64, String> {
    match value {
        serde_json::Value::Number(number) => number.as_i64().ok_or_else(|| format!("id {number} is not an integer")),
        serde_json::Value::String(raw) => raw.trim().parse::<i64>().map_err(|_| format!("id {raw:?} is not an integer")),
        _ => Err("expected integer id".to_owned()),
    }
}
