//! Sign-in / sign-up screen
//!
//! The only place a session starts. A successful sign-in stores the token,
//! which flips the session gate, and then opens the signed-in stack.

use app_state::Flow;
use blog_api::{Credentials, ErrorKind};
use parking_lot::Mutex;

use super::{ScreenContext, NETWORK_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use crate::navigation::Route;
use crate::theme::ThemeName;

/// Shown when the backend refuses the credentials
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

/// Shown when a field is left empty
pub const MISSING_FIELDS_MESSAGE: &str = "Please enter a username and password.";

/// Which form is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInMode {
    /// Existing account
    #[default]
    SignIn,
    /// New account, signed in right after creation
    SignUp,
}

/// Everything the sign-in screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInView {
    /// Form mode
    pub mode: SignInMode,
    /// Username field
    pub username: String,
    /// Whether the password field is non-empty
    pub has_password: bool,
    /// Request in flight
    pub submitting: bool,
    /// Active theme
    pub theme: ThemeName,
    /// User-visible message
    pub error: Option<String>,
}

#[derive(Default)]
struct SignInState {
    mode: SignInMode,
    username: String,
    password: String,
    submitting: bool,
    error: Option<String>,
}

impl std::fmt::Debug for SignInState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInState")
            .field("mode", &self.mode)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("submitting", &self.submitting)
            .field("error", &self.error)
            .finish()
    }
}

/// Controller for the sign-in / sign-up screen
#[derive(Debug)]
pub struct SignInController {
    ctx: ScreenContext,
    state: Mutex<SignInState>,
}

impl SignInController {
    /// Create a controller
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, state: Mutex::new(SignInState::default()) }
    }

    /// Screen shown: surface why the user landed here, if known
    pub fn on_activate(&self) {
        if let Some(notice) = self.ctx.take_notice() {
            self.state.lock().error = Some(notice);
        }
    }

    /// Current view
    pub fn view(&self) -> SignInView {
        let state = self.state.lock();
        SignInView {
            mode: state.mode,
            username: state.username.clone(),
            has_password: !state.password.is_empty(),
            submitting: state.submitting,
            theme: ThemeName::from_is_dark(self.ctx.session.is_dark()),
            error: state.error.clone(),
        }
    }

    /// Message from the last failed call, cleared by the next success
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Switch between sign-in and sign-up
    pub fn set_mode(&self, mode: SignInMode) {
        let mut state = self.state.lock();
        state.mode = mode;
        state.error = None;
    }

    /// Edit the username
    pub fn set_username(&self, username: impl Into<String>) {
        self.state.lock().username = username.into();
    }

    /// Edit the password
    pub fn set_password(&self, password: impl Into<String>) {
        self.state.lock().password = password.into();
    }

    /// Submit the form; returns `true` once signed in
    pub async fn submit(&self) -> bool {
        let (mode, credentials) = {
            let mut state = self.state.lock();
            if state.submitting {
                return false;
            }
            if state.username.trim().is_empty() || state.password.is_empty() {
                state.error = Some(MISSING_FIELDS_MESSAGE.to_string());
                return false;
            }
            state.submitting = true;
            (state.mode, Credentials::new(state.username.trim(), state.password.clone()))
        };

        let result = self.authenticate(mode, &credentials).await;

        let mut state = self.state.lock();
        state.submitting = false;
        match result {
            Ok(token) => {
                state.password.clear();
                state.error = None;
                drop(state);

                self.ctx.session.set_token(token).await;
                tracing::info!(username = %credentials.username, "signed in");
                self.ctx.navigator.navigate(Route::entry_for(Flow::Authenticated));
                true
            }
            Err(message) => {
                state.error = Some(message);
                false
            }
        }
    }

    async fn authenticate(&self, mode: SignInMode, credentials: &Credentials) -> Result<String, String> {
        if mode == SignInMode::SignUp {
            self.ctx.api.sign_up(credentials).await.map_err(|e| {
                tracing::warn!(error = %e, "sign-up failed");
                match e.kind() {
                    ErrorKind::Network => NETWORK_ERROR_MESSAGE.to_string(),
                    _ => UNKNOWN_ERROR_MESSAGE.to_string(),
                }
            })?;
        }

        self.ctx
            .api
            .sign_in(credentials)
            .await
            .map(|t| t.access_token)
            .map_err(|e| {
                tracing::warn!(error = %e, "sign-in failed");
                match e.kind() {
                    ErrorKind::AuthRejected => INVALID_CREDENTIALS_MESSAGE.to_string(),
                    ErrorKind::Network => NETWORK_ERROR_MESSAGE.to_string(),
                    ErrorKind::Unknown => UNKNOWN_ERROR_MESSAGE.to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MockNavigator;
    use crate::screens::SESSION_EXPIRED_MESSAGE;
    use app_state::SessionStore;
    use blog_api::{ApiError, AuthToken, MockBlogApi};
    use std::sync::Arc;

    fn context(api: MockBlogApi, navigations: usize) -> ScreenContext {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .withf(|r| *r == Route::Index { post: None })
            .times(navigations)
            .return_const(());
        ScreenContext::new(SessionStore::new(), Arc::new(api), Arc::new(navigator))
    }

    #[tokio::test]
    async fn test_sign_in_sets_token() {
        let mut api = MockBlogApi::new();
        api.expect_sign_in()
            .withf(|c| c.username == "alice" && c.password == "pw")
            .times(1)
            .returning(|_| Ok(AuthToken { access_token: "tok".into() }));

        let ctx = context(api, 1);
        let controller = SignInController::new(ctx.clone());
        controller.set_username(" alice ");
        controller.set_password("pw");

        assert!(controller.submit().await);
        assert_eq!(ctx.session.token().as_deref(), Some("tok"));
        assert!(!controller.view().has_password);
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let mut api = MockBlogApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_sign_up().times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        api.expect_sign_in()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(AuthToken { access_token: "new".into() }));

        let ctx = context(api, 1);
        let controller = SignInController::new(ctx.clone());
        controller.set_mode(SignInMode::SignUp);
        controller.set_username("bob");
        controller.set_password("pw");

        assert!(controller.submit().await);
        assert_eq!(ctx.session.token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let mut api = MockBlogApi::new();
        api.expect_sign_in().returning(|_| Err(ApiError::AuthRejected { status: 401 }));

        let ctx = context(api, 0);
        let controller = SignInController::new(ctx.clone());
        controller.set_username("alice");
        controller.set_password("wrong");

        assert!(!controller.submit().await);
        assert!(ctx.session.token().is_none());
        assert_eq!(controller.view().error.as_deref(), Some(INVALID_CREDENTIALS_MESSAGE));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let controller = SignInController::new(context(MockBlogApi::new(), 0));
        controller.set_username("alice");

        assert!(!controller.submit().await);
        assert_eq!(controller.view().error.as_deref(), Some(MISSING_FIELDS_MESSAGE));
    }

    #[tokio::test]
    async fn test_shows_expired_notice() {
        let ctx = context(MockBlogApi::new(), 0);
        ctx.post_notice(SESSION_EXPIRED_MESSAGE);

        let controller = SignInController::new(ctx);
        controller.on_activate();
        assert_eq!(controller.view().error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
    }
}
