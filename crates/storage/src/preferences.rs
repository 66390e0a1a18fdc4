//! Display preferences and the persisted session record

use serde::{Deserialize, Serialize};

/// User-facing display preferences
///
/// These are independent of the session: signing out keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    /// Dark mode enabled
    #[serde(default)]
    pub is_dark: bool,

    /// URI of the captured profile picture, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl DisplayPreferences {
    /// Flip dark mode, returning the new value
    pub fn toggle_dark(&mut self) -> bool {
        self.is_dark = !self.is_dark;
        self.is_dark
    }
}

/// Everything written to disk when session persistence is enabled
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Session token, absent when signed out
    #[serde(default)]
    pub token: Option<String>,

    /// Display preferences
    #[serde(default)]
    pub display: DisplayPreferences,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("display", &self.display)
            .finish()
    }
}
