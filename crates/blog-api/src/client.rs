//! HTTP client for the Pocket Blog backend
//!
//! This module provides request/response types, client configuration, and
//! [`ApiClient`], which executes requests against a fixed base URL and maps
//! every outcome into [`crate::ApiError`] through a [`ResponseClassifier`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::classify::{BodyStatusClassifier, ResponseClass, ResponseClassifier};
use crate::types::{AuthToken, Credentials, Post, PostDraft, WhoAmI};
use crate::{ApiError, BlogApi, Result};

/// Endpoint paths relative to the base URL
pub mod endpoints {
    /// Sign in
    pub const AUTH: &str = "/auth";
    /// Sign up
    pub const NEW_USER: &str = "/newuser";
    /// Current user
    pub const WHOAMI: &str = "/whoami";
    /// Create a post
    pub const CREATE: &str = "/create";
    /// List posts
    pub const POSTS: &str = "/posts";
}

/// Shorten a token for logs: the first four characters and an ellipsis
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method of an API request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request to the backend
///
/// When `token` is set the client adds `Authorization: <scheme> <token>`.
#[derive(Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g. "/whoami")
    pub path: String,
    /// Session token, if the call is authenticated
    pub token: Option<String>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// JSON-encoded request body
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a request with an arbitrary method
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), token: None, headers: HashMap::new(), body: None }
    }

    /// Authenticate the request with a session token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("token", &self.token.as_deref().map(redact_token))
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Decoded response from the backend
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new response
    pub fn new(status: u16, data: T) -> Self {
        Self { status, data }
    }
}

/// Fields the backend may use to describe an error
#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn describe_error_body(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(text) = parsed.description.or(parsed.message).or(parsed.error) {
            return text;
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Default backend URL
pub const DEFAULT_BASE_URL: &str = "https://pocket-blog.example.com";

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Scheme placed before the token in `Authorization`
    pub auth_scheme: String,
    /// Headers included in every request
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Pocket-Blog/{}", env!("CARGO_PKG_VERSION")),
            auth_scheme: "JWT".to_string(),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the authorization scheme
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Join the base URL and a path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// HTTP client for the Pocket Blog backend
///
/// # Examples
/// ```
/// use blog_api::{ApiClient, ApiClientConfig, BlogApi};
///
/// async fn example() -> blog_api::Result<()> {
///     let client = ApiClient::new(ApiClientConfig::new("https://blog.example.com"))?;
///     let me = client.whoami("token").await?;
///     println!("Hello {}", me.username);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiClientConfig,
    classifier: Arc<dyn ResponseClassifier>,
}

impl ApiClient {
    /// Create a client using [`BodyStatusClassifier`]
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { client, config, classifier: Arc::new(BodyStatusClassifier) })
    }

    /// Replace the response classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn ResponseClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get the client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Execute a request and decode a successful body as `T`
    pub async fn send<T>(&self, request: ApiRequest) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.config.url_for(&request.path);
        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let mut req = self.client.request(request.method.into(), &url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }
        for (key, value) in &request.headers {
            req = req.header(key, value);
        }
        if let Some(token) = &request.token {
            req = req.header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.config.auth_scheme, token),
            );
        }
        if let Some(body) = request.body {
            req = req.header(reqwest::header::CONTENT_TYPE, "application/json").body(body);
        }

        let response = req.send().await.map_err(|e| {
            // Builder errors never reach the network (e.g. a token that is not a valid header)
            if e.is_builder() {
                tracing::error!(%url, error = %e, "request could not be built");
                return ApiError::Unknown { status: None, message: format!("Invalid request: {}", e) };
            }
            tracing::warn!(%url, error = %e, "request failed without a response");
            ApiError::Network(format!("Request failed: {}", e))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            ApiError::Network(format!("Failed to read response: {}", e))
        })?;

        match self.classifier.classify(status, &body) {
            ResponseClass::Success => {
                // Empty 2xx bodies decode as `null`
                let data = if body.is_empty() {
                    serde_json::from_slice(b"null")
                } else {
                    serde_json::from_slice(&body)
                }
                .map_err(|e| ApiError::Unknown {
                    status: Some(status),
                    message: format!("Failed to parse JSON: {}", e),
                })?;
                Ok(ApiResponse::new(status, data))
            }
            ResponseClass::AuthRejected => {
                tracing::warn!(%url, status, "session rejected by backend");
                Err(ApiError::AuthRejected { status })
            }
            ResponseClass::Failure => {
                let message = describe_error_body(&body);
                tracing::error!(%url, status, %message, "request failed");
                Err(ApiError::Unknown { status: Some(status), message })
            }
        }
    }
}

#[async_trait]
impl BlogApi for ApiClient {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthToken> {
        let request = ApiRequest::post(endpoints::AUTH).json_body(credentials)?;
        Ok(self.send::<AuthToken>(request).await?.data)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<()> {
        let request = ApiRequest::post(endpoints::NEW_USER).json_body(credentials)?;
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn whoami(&self, token: &str) -> Result<WhoAmI> {
        let request = ApiRequest::get(endpoints::WHOAMI).token(token);
        Ok(self.send::<WhoAmI>(request).await?.data)
    }

    async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<serde_json::Value> {
        let request = ApiRequest::post(endpoints::CREATE).token(token).json_body(draft)?;
        Ok(self.send::<serde_json::Value>(request).await?.data)
    }

    async fn list_posts(&self, token: &str) -> Result<Vec<Post>> {
        let request = ApiRequest::get(endpoints::POSTS).token(token);
        Ok(self.send::<Vec<Post>>(request).await?.data)
    }
}
