//! Application state management for Pocket Blog
//!
//! This crate holds the session (token and display preferences) with
//! watch-channel change notification, and the gate that derives the active
//! flow from it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod session;

pub use gate::{Flow, SessionGate};
pub use session::{SessionConfig, SessionError, SessionSnapshot, SessionStore};
