//! Pocket Blog
//!
//! Composition root for the Pocket Blog client. Wires the session store, the
//! API client, the session gate and the screen controllers together.
//!
//! # Crates
//!
//! - [`blog_api`] - HTTP client and response classification
//! - [`storage`] - Versioned JSON persistence
//! - [`app_state`] - Session store and session gate
//! - [`app_ui`] - Navigation, theme, screen controllers
//!
//! # Example
//! ```no_run
//! use pocket_blog::{telemetry, App, AppConfig};
//!
//! # async fn example() -> pocket_blog::Result<()> {
//! let config = AppConfig::from_env()?;
//! telemetry::init(config.log_filter.as_deref())?;
//!
//! let app = App::start(config).await?;
//! app.sign_in().set_username("alice");
//! app.sign_in().set_password("secret");
//! app.sign_in().submit().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod app;
pub mod config;
pub mod telemetry;

pub use app::App;
pub use config::AppConfig;

pub use app_state::{Flow, SessionGate, SessionStore};
pub use app_ui::{Route, SharedNavigation};

/// Result type for application bootstrap
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors raised while starting the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// API client could not be built
    #[error("API client error: {0}")]
    Api(#[from] blog_api::ApiError),

    /// Session store could not be opened
    #[error("Session error: {0}")]
    Session(#[from] app_state::SessionError),

    /// An environment variable held an unusable value
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig {
        /// Variable name
        key: &'static str,
        /// What was wrong
        message: String,
    },

    /// Logging could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
