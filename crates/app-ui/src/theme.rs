//! Theme selection
//!
//! Only the light/dark decision lives here; drawing is the renderer's job.

use serde::{Deserialize, Serialize};
use storage::DisplayPreferences;

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl ThemeName {
    /// Theme for the dark-mode flag
    pub fn from_is_dark(is_dark: bool) -> Self {
        if is_dark {
            ThemeName::Dark
        } else {
            ThemeName::Light
        }
    }

    /// Theme for a set of display preferences
    pub fn for_preferences(prefs: &DisplayPreferences) -> Self {
        Self::from_is_dark(prefs.is_dark)
    }

    /// Check if this is a dark theme
    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeName::Dark)
    }

    /// Status bar content style that stays readable on this theme
    pub fn status_bar(&self) -> StatusBarStyle {
        match self {
            ThemeName::Light => StatusBarStyle::Dark,
            ThemeName::Dark => StatusBarStyle::Light,
        }
    }
}

/// Color of the status bar content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    /// Light text and icons
    Light,
    /// Dark text and icons
    Dark,
}
