//! Session store
//!
//! The single source of truth for "is the user signed in". The token changes
//! only through [`SessionStore::set_token`] and the clear operations; every
//! change is pushed to subscribers before the call returns.
//!
//! Each `set_token` starts a new generation. Screens capture a
//! [`SessionSnapshot`] before a request and later clear with
//! [`SessionStore::clear_token_if`], so a rejection that belongs to an older
//! session can never sign out a newer one, and concurrent rejections of the
//! same session produce exactly one sign-out.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{DisplayPreferences, PersistedState, PersistenceConfig, PersistenceError, StoredSession};
use tokio::sync::watch;

/// Session-related errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Persisted session could not be loaded
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Session store configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// File the session is mirrored to. `None` keeps it in memory for the
    /// lifetime of the process.
    ///
    /// A file that is corrupt or from another schema version is discarded
    /// with a warning and the store starts signed out. Only IO failures such
    /// as a permission error make [`SessionStore::open`] fail.
    pub persist_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Memory-only session
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session persisted to `path`
    pub fn persisted(path: impl Into<PathBuf>) -> Self {
        Self { persist_path: Some(path.into()) }
    }
}

/// The token together with the generation it belongs to
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    token: Option<String>,
    generation: u64,
}

impl SessionSnapshot {
    /// Session token, if signed in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Generation counter, bumped by every `set_token`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("generation", &self.generation)
            .finish()
    }
}

struct Inner {
    session_tx: watch::Sender<SessionSnapshot>,
    display_tx: watch::Sender<DisplayPreferences>,
    /// Serialises writes so the file always ends with the latest state
    persistence: Option<tokio::sync::Mutex<PersistedState<StoredSession>>>,
    /// Guards read-modify-write of the snapshot
    write_lock: Mutex<()>,
}

/// Process-wide session context
///
/// Cheap to clone; clones share state. Pass one to every controller.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        Self::from_parts(StoredSession::default(), None)
    }

    /// Create a store according to `config`, restoring a persisted session
    pub async fn open(config: SessionConfig) -> Result<Self> {
        match config.persist_path {
            None => Ok(Self::new()),
            Some(path) => {
                let persisted: PersistedState<StoredSession> =
                    PersistedState::open_or_reset(PersistenceConfig::new(path)).await?;
                let stored = persisted.get().await;
                tracing::info!(
                    path = %persisted.path().display(),
                    restored = stored.token.is_some(),
                    "session store opened"
                );
                Ok(Self::from_parts(stored, Some(persisted)))
            }
        }
    }

    fn from_parts(stored: StoredSession, persistence: Option<PersistedState<StoredSession>>) -> Self {
        let generation = u64::from(stored.token.is_some());
        let (session_tx, _) = watch::channel(SessionSnapshot { token: stored.token, generation });
        let (display_tx, _) = watch::channel(stored.display);

        Self {
            inner: Arc::new(Inner {
                session_tx,
                display_tx,
                persistence: persistence.map(tokio::sync::Mutex::new),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Current token, if signed in
    pub fn token(&self) -> Option<String> {
        self.inner.session_tx.borrow().token.clone()
    }

    /// Current token with its generation
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session_tx.borrow().clone()
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        self.inner.session_tx.borrow().is_authenticated()
    }

    /// Start a new session with `token`
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        {
            let _guard = self.inner.write_lock.lock();
            self.inner.session_tx.send_modify(|snapshot| {
                snapshot.token = Some(token);
                snapshot.generation += 1;
            });
        }
        tracing::info!(generation = self.snapshot().generation, "session started");
        self.persist().await;
    }

    /// End the current session
    ///
    /// Idempotent. Returns `true` if a token was present.
    pub async fn clear_token(&self) -> bool {
        let cleared = {
            let _guard = self.inner.write_lock.lock();
            self.inner.session_tx.send_if_modified(|snapshot| snapshot.token.take().is_some())
        };
        if cleared {
            tracing::info!("session cleared");
            self.persist().await;
        }
        cleared
    }

    /// End the session only if it is still generation `generation`
    ///
    /// Returns `true` for the one caller that actually cleared it. Callers
    /// that lose the race, or whose session was already replaced, get `false`
    /// and must not navigate.
    pub async fn clear_token_if(&self, generation: u64) -> bool {
        let cleared = {
            let _guard = self.inner.write_lock.lock();
            self.inner.session_tx.send_if_modified(|snapshot| {
                snapshot.generation == generation && snapshot.token.take().is_some()
            })
        };
        if cleared {
            tracing::info!(generation, "session invalidated");
            self.persist().await;
        } else {
            tracing::debug!(generation, "stale session invalidation ignored");
        }
        cleared
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.session_tx.subscribe()
    }

    /// Current display preferences
    pub fn display(&self) -> DisplayPreferences {
        self.inner.display_tx.borrow().clone()
    }

    /// Whether dark mode is on
    pub fn is_dark(&self) -> bool {
        self.inner.display_tx.borrow().is_dark
    }

    /// Set dark mode
    pub async fn set_dark_mode(&self, is_dark: bool) {
        let changed = self.inner.display_tx.send_if_modified(|prefs| {
            let changed = prefs.is_dark != is_dark;
            prefs.is_dark = is_dark;
            changed
        });
        if changed {
            self.persist().await;
        }
    }

    /// Flip dark mode, returning the new value
    pub async fn toggle_dark_mode(&self) -> bool {
        let mut is_dark = false;
        self.inner.display_tx.send_modify(|prefs| is_dark = prefs.toggle_dark());
        self.persist().await;
        is_dark
    }

    /// Set or remove the profile picture URI
    pub async fn set_profile_picture(&self, uri: Option<String>) {
        let changed = self.inner.display_tx.send_if_modified(|prefs| {
            let changed = prefs.profile_picture != uri;
            prefs.profile_picture = uri;
            changed
        });
        if changed {
            self.persist().await;
        }
    }

    /// Remove the profile picture URI
    pub async fn clear_profile_picture(&self) {
        self.set_profile_picture(None).await;
    }

    /// Subscribe to display preference changes
    pub fn subscribe_display(&self) -> watch::Receiver<DisplayPreferences> {
        self.inner.display_tx.subscribe()
    }

    /// Whether the session is mirrored to disk
    pub fn is_persistent(&self) -> bool {
        self.inner.persistence.is_some()
    }

    /// Write the current state through to disk
    ///
    /// Failures are logged, not returned: the in-memory session stays
    /// authoritative.
    async fn persist(&self) {
        let Some(persistence) = &self.inner.persistence else {
            return;
        };

        let persisted = persistence.lock().await;
        // Read under the lock so the last writer always writes the latest state
        let stored = StoredSession { token: self.token(), display: self.display() };
        if let Err(e) = persisted.set(stored).await {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.inner.session_tx.borrow())
            .field("display", &*self.inner.display_tx.borrow())
            .field("persistent", &self.is_persistent())
            .finish()
    }
}
