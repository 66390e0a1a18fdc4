//! Logging initialisation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{AppError, Result};

/// Filter used when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_FILTER: &str = "pocket_blog=info,blog_api=info,app_state=info,app_ui=info,warn";

/// Build the filter: `filter` first, then `RUST_LOG`, then [`DEFAULT_FILTER`]
pub fn env_filter(filter: Option<&str>) -> EnvFilter {
    filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init(filter: Option<&str>) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_wins() {
        let filter = env_filter(Some("blog_api=trace"));
        assert_eq!(filter.to_string(), "blog_api=trace");
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init(Some("warn"));
        assert!(matches!(init(Some("warn")), Err(AppError::Telemetry(_))));
    }
}
