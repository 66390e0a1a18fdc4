//! Storage layer for Pocket Blog
//!
//! This crate provides versioned, checksummed JSON persistence and the
//! records the app keeps across restarts when persistence is enabled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod persistence;
pub mod preferences;

pub use persistence::{PersistedState, PersistenceConfig, PersistenceError};
pub use preferences::{DisplayPreferences, StoredSession};
