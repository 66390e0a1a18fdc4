//! Screen controllers
//!
//! Every controller reads the session through a shared [`ScreenContext`],
//! calls the API with the token it captured, and reports failures at its
//! own boundary:
//!
//! - network failure: user-visible message, session untouched
//! - rejected session: the session is cleared and the user is sent to
//!   `SignInSignUp`, once, however many requests were rejected together
//! - anything else: logged and shown, session untouched
//!
//! Activation is explicit. The renderer calls `on_activate` when a screen is
//! mounted or regains focus, and `on_deactivate` when it goes away. A response
//! that arrives for an older activation is dropped.

mod account;
mod create;
mod edit;
mod index;
mod sign_in;

pub use account::{AccountController, AccountView, Username};
pub use create::{CreateController, CreateView, SubmitOutcome};
pub use edit::{EditController, EditView};
pub use index::{IndexController, IndexView};
pub use sign_in::{SignInController, SignInMode, SignInView};

use app_state::{SessionSnapshot, SessionStore};
use blog_api::{ApiError, BlogApi, ErrorKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::navigation::{Navigator, Route};

/// Shown on the sign-in screen after a forced sign-out
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Shown when the server could not be reached
pub const NETWORK_ERROR_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// Shown for unexpected failures
pub const UNKNOWN_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Dependencies shared by all screen controllers
#[derive(Clone)]
pub struct ScreenContext {
    /// Session store
    pub session: SessionStore,
    /// Backend API
    pub api: Arc<dyn BlogApi>,
    /// Navigation sink
    pub navigator: Arc<dyn Navigator>,
    notice: Arc<Mutex<Option<String>>>,
}

impl ScreenContext {
    /// Bundle the shared dependencies
    pub fn new(session: SessionStore, api: Arc<dyn BlogApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, api, navigator, notice: Arc::new(Mutex::new(None)) }
    }

    /// Leave a message for the next screen to pick up
    pub fn post_notice(&self, message: impl Into<String>) {
        *self.notice.lock() = Some(message.into());
    }

    /// Take the pending message, if any
    pub fn take_notice(&self) -> Option<String> {
        self.notice.lock().take()
    }

    /// Sign out because the backend rejected `snapshot`'s session
    ///
    /// Returns `true` if this call performed the sign-out.
    pub(crate) async fn sign_out_rejected(&self, snapshot: &SessionSnapshot) -> bool {
        if !self.session.clear_token_if(snapshot.generation()).await {
            return false;
        }
        self.post_notice(SESSION_EXPIRED_MESSAGE);
        self.navigator.navigate(Route::SignInSignUp);
        true
    }

    /// Apply the error policy to a failed call
    ///
    /// Returns the message to display, or `None` when the session was
    /// rejected (the user is leaving this screen).
    pub(crate) async fn handle_error(
        &self,
        screen: &'static str,
        snapshot: &SessionSnapshot,
        error: &ApiError,
    ) -> Option<String> {
        match error.kind() {
            ErrorKind::AuthRejected => {
                let signed_out = self.sign_out_rejected(snapshot).await;
                tracing::warn!(screen, signed_out, "session rejected");
                None
            }
            ErrorKind::Network => {
                tracing::warn!(screen, error = %error, "network failure");
                Some(NETWORK_ERROR_MESSAGE.to_string())
            }
            ErrorKind::Unknown => {
                tracing::error!(screen, error = %error, "request failed");
                Some(UNKNOWN_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenContext").field("session", &self.session).finish_non_exhaustive()
    }
}

/// Tracks whether a controller is active and which activation is current
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    /// Current activation; 0 while inactive
    epoch: AtomicU64,
    counter: AtomicU64,
}

impl Lifecycle {
    /// Begin a new activation and return its id
    pub(crate) fn activate(&self) -> u64 {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.epoch.store(id, Ordering::SeqCst);
        id
    }

    /// Mark the controller inactive
    pub(crate) fn deactivate(&self) {
        self.epoch.store(0, Ordering::SeqCst);
    }

    /// Current activation id, if active
    pub(crate) fn current(&self) -> Option<u64> {
        match self.epoch.load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }

    /// Whether `id` is still the live activation
    pub(crate) fn is_current(&self, id: u64) -> bool {
        id != 0 && self.epoch.load(Ordering::SeqCst) == id
    }
}
