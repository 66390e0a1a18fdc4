//! Application configuration

use app_state::SessionConfig;
use blog_api::ApiClientConfig;
use std::time::Duration;

use crate::{AppError, Result};

/// Backend base URL
pub const ENV_API_URL: &str = "POCKET_BLOG_API_URL";
/// Request timeout in whole seconds
pub const ENV_TIMEOUT_SECS: &str = "POCKET_BLOG_TIMEOUT_SECS";
/// File the session is persisted to; unset keeps it in memory
pub const ENV_SESSION_FILE: &str = "POCKET_BLOG_SESSION_FILE";
/// Log filter directive
pub const ENV_LOG: &str = "POCKET_BLOG_LOG";

/// Everything needed to start an [`crate::App`]
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// API client settings
    pub api: ApiClientConfig,
    /// Session store settings
    pub session: SessionConfig,
    /// Log filter; `None` defers to `RUST_LOG`
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::InvalidConfig {
                    key: ENV_API_URL,
                    message: format!("expected an http(s) URL, got {url:?}"),
                });
            }
            config.api.base_url = url;
        }

        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|e| AppError::InvalidConfig {
                key: ENV_TIMEOUT_SECS,
                message: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(AppError::InvalidConfig {
                    key: ENV_TIMEOUT_SECS,
                    message: "timeout must be positive".to_string(),
                });
            }
            config.api.timeout = Duration::from_secs(secs);
        }

        if let Some(path) = get(ENV_SESSION_FILE) {
            config.session = SessionConfig::persisted(path);
        }

        config.log_filter = get(ENV_LOG);
        Ok(config)
    }

    /// Point the API client at `base_url`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api.base_url, blog_api::client::DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.session.persist_path.is_none());
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_API_URL, "http://localhost:8000"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_SESSION_FILE, "/tmp/session.json"),
            (ENV_LOG, "pocket_blog=debug"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(
            config.session.persist_path.as_deref(),
            Some(std::path::Path::new("/tmp/session.json"))
        );
        assert_eq!(config.log_filter.as_deref(), Some("pocket_blog=debug"));
    }

    #[test]
    fn test_empty_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_API_URL, " "), (ENV_LOG, "")])).unwrap();
        assert_eq!(config.api.base_url, blog_api::client::DEFAULT_BASE_URL);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { key: ENV_TIMEOUT_SECS, .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { key: ENV_TIMEOUT_SECS, .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_URL, "blog.example.com")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { key: ENV_API_URL, .. }));
    }
}
