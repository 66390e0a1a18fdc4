//! Edit screen
//!
//! Renders a themed title only; there is no backend edit endpoint yet.

use super::ScreenContext;
use crate::theme::ThemeName;

/// Heading shown on the edit screen
pub const EDIT_TITLE: &str = "Edit Screen";

/// Everything the edit screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditView {
    /// Heading
    pub title: &'static str,
    /// Active theme
    pub theme: ThemeName,
}

/// Controller for the edit screen
#[derive(Debug)]
pub struct EditController {
    ctx: ScreenContext,
}

impl EditController {
    /// Create a controller
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx }
    }

    /// Current view
    pub fn view(&self) -> EditView {
        EditView { title: EDIT_TITLE, theme: ThemeName::from_is_dark(self.ctx.session.is_dark()) }
    }
}
