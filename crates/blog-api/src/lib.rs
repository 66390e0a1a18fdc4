//! Pocket Blog API client
//!
//! This crate talks to the Pocket Blog backend over JSON/HTTP. It builds
//! requests, attaches the session token, and classifies every response into
//! success, authentication rejection, or failure.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod client;
pub mod types;

use async_trait::async_trait;

pub use classify::{BodyStatusClassifier, HttpStatusClassifier, ResponseClass, ResponseClassifier};
pub use client::{ApiClient, ApiClientConfig, ApiRequest, ApiResponse, HttpMethod};
pub use types::{AuthToken, Credentials, Post, PostDraft, WhoAmI};

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Broad category of an [`ApiError`]
///
/// Screen controllers branch on this rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received
    Network,
    /// The backend says the session is no longer valid
    AuthRejected,
    /// Anything else
    Unknown,
}

/// Error types for API operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the session credential
    #[error("Authentication rejected (HTTP {status})")]
    AuthRejected {
        /// HTTP status line of the rejecting response
        status: u16,
    },

    /// Response of an unexpected shape
    #[error("Unexpected response ({}): {message}", status.map_or_else(|| "no status".to_string(), |s| s.to_string()))]
    Unknown {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Error detail
        message: String,
    },

    /// Request body could not be encoded
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The HTTP client could not be constructed
    #[error("Client setup error: {0}")]
    Client(String),
}

impl ApiError {
    /// Classify this error for the screen-controller boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::AuthRejected { .. } => ErrorKind::AuthRejected,
            ApiError::Unknown { .. } | ApiError::Encode(_) | ApiError::Client(_) => {
                ErrorKind::Unknown
            }
        }
    }

    /// Whether this error invalidates the current session
    pub fn is_auth_rejected(&self) -> bool {
        self.kind() == ErrorKind::AuthRejected
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Encode(err.to_string())
    }
}

/// The backend operations used by the app
///
/// [`ApiClient`] is the production implementation. Controllers hold an
/// `Arc<dyn BlogApi>` so tests can substitute a mock.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait BlogApi: Send + Sync {
    /// Exchange credentials for a session token (`POST /auth`)
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthToken>;

    /// Register a new user (`POST /newuser`)
    async fn sign_up(&self, credentials: &Credentials) -> Result<()>;

    /// Identify the user owning `token` (`GET /whoami`)
    async fn whoami(&self, token: &str) -> Result<WhoAmI>;

    /// Submit a draft as a new post (`POST /create`)
    async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<serde_json::Value>;

    /// List posts (`GET /posts`)
    async fn list_posts(&self, token: &str) -> Result<Vec<Post>>;
}
