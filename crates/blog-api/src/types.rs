//! Wire types for the Pocket Blog backend

use serde::{Deserialize, Serialize};

/// Username/password pair for `/auth` and `/newuser`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of a successful sign-in
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthToken {
    /// Session credential, sent back as `Authorization: JWT <token>`
    pub access_token: String,
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &crate::client::redact_token(&self.access_token))
            .finish()
    }
}

/// Response of `GET /whoami`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmI {
    /// Name of the signed-in user
    pub username: String,
}

/// Unsaved post contents
///
/// Serialises to exactly `{"title": ..., "content": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
}

impl PostDraft {
    /// Create a draft
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }

    /// True when both fields are empty
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// A stored post as listed by `GET /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Server-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
}

impl Post {
    /// Whether this post carries the same text as `draft`
    pub fn matches_draft(&self, draft: &PostDraft) -> bool {
        self.title == draft.title && self.content == draft.content
    }
}

impl From<PostDraft> for Post {
    fn from(draft: PostDraft) -> Self {
        Self { id: None, title: draft.title, content: draft.content }
    }
}
