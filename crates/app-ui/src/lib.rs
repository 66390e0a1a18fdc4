//! User interface layer for Pocket Blog
//!
//! The renderer itself is external. This crate provides what it consumes:
//! routes and navigation state, theme selection, and one controller per
//! screen that owns the screen's state, talks to the API, and handles a
//! rejected session.
//!
//! # Modules
//!
//! - [`navigation`] - Routes, root stacks, and the [`Navigator`] seam
//! - [`theme`] - Light/dark selection
//! - [`screens`] - Screen controllers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod screens;
pub mod theme;

pub use navigation::{NavigationState, Navigator, RootStack, Route, SharedNavigation, StackEntry};
pub use screens::{
    AccountController, CreateController, EditController, IndexController, ScreenContext,
    SignInController, SignInMode, SubmitOutcome, Username,
};
pub use theme::{StatusBarStyle, ThemeName};
