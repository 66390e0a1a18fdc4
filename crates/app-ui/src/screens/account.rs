//! Account screen: greeting, profile picture, dark mode, sign-out

use parking_lot::Mutex;

use super::{Lifecycle, ScreenContext};
use crate::navigation::Route;
use crate::theme::ThemeName;

/// Username display state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Username {
    /// Not fetched yet
    #[default]
    Unknown,
    /// Request in flight
    Loading,
    /// Server answered
    Loaded(String),
}

/// Everything the account screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    /// Greeting name
    pub username: Username,
    /// Active theme
    pub theme: ThemeName,
    /// Profile picture URI
    pub profile_picture: Option<String>,
    /// User-visible error
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct AccountState {
    username: Username,
    error: Option<String>,
}

/// Controller for the account screen
#[derive(Debug)]
pub struct AccountController {
    ctx: ScreenContext,
    lifecycle: Lifecycle,
    state: Mutex<AccountState>,
}

impl AccountController {
    /// Create a controller
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, lifecycle: Lifecycle::default(), state: Mutex::new(AccountState::default()) }
    }

    /// Screen mounted or regained focus: refetch the username
    ///
    /// The session may have changed while the screen was in the background,
    /// so this runs on every activation.
    pub async fn on_activate(&self) {
        let activation = self.lifecycle.activate();
        let snapshot = self.ctx.session.snapshot();
        let Some(token) = snapshot.token() else {
            tracing::debug!("account activated without a session");
            return;
        };

        self.state.lock().username = Username::Loading;
        let result = self.ctx.api.whoami(token).await;

        if !self.lifecycle.is_current(activation) {
            tracing::debug!("dropping stale whoami response");
            return;
        }

        match result {
            Ok(me) => {
                let mut state = self.state.lock();
                state.username = Username::Loaded(me.username);
                state.error = None;
            }
            Err(e) => {
                let message = self.ctx.handle_error("account", &snapshot, &e).await;
                let mut state = self.state.lock();
                if state.username == Username::Loading {
                    state.username = Username::Unknown;
                }
                state.error = message;
            }
        }
    }

    /// Screen lost focus or unmounted
    pub fn on_deactivate(&self) {
        self.lifecycle.deactivate();
    }

    /// Current view
    pub fn view(&self) -> AccountView {
        let state = self.state.lock();
        let display = self.ctx.session.display();
        AccountView {
            username: state.username.clone(),
            theme: ThemeName::for_preferences(&display),
            profile_picture: display.profile_picture,
            error: state.error.clone(),
        }
    }

    /// Message from the last failed call, cleared by the next success
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Flip dark mode, returning the new value
    pub async fn toggle_dark_mode(&self) -> bool {
        self.ctx.session.toggle_dark_mode().await
    }

    /// Open the camera to take or replace the profile picture
    pub fn open_camera(&self) {
        self.ctx.navigator.navigate(Route::Camera);
    }

    /// Remove the stored profile picture
    pub async fn delete_profile_picture(&self) {
        self.ctx.session.clear_profile_picture().await;
    }

    /// Explicit sign-out
    pub async fn sign_out(&self) {
        self.ctx.session.clear_token().await;
        *self.state.lock() = AccountState::default();
        self.ctx.navigator.navigate(Route::SignInSignUp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::test_support::{signed_in_context, signed_in_context_with, HeldApi};
    use crate::screens::NETWORK_ERROR_MESSAGE;
    use blog_api::{ApiError, MockBlogApi, WhoAmI};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_activate_loads_username() {
        let mut api = MockBlogApi::new();
        api.expect_whoami()
            .withf(|token| token == "abc")
            .times(2)
            .returning(|_| Ok(WhoAmI { username: "alice".into() }));

        let controller = AccountController::new(signed_in_context(api, 0).await);
        assert_eq!(controller.view().username, Username::Unknown);

        controller.on_activate().await;
        assert_eq!(controller.view().username, Username::Loaded("alice".into()));

        // Regaining focus refetches
        controller.on_deactivate();
        controller.on_activate().await;
        assert_eq!(controller.view().username, Username::Loaded("alice".into()));
    }

    #[tokio::test]
    async fn test_rejected_session_signs_out() {
        let mut api = MockBlogApi::new();
        api.expect_whoami().returning(|_| Err(ApiError::AuthRejected { status: 401 }));

        let ctx = signed_in_context(api, 1).await;
        let controller = AccountController::new(ctx.clone());

        controller.on_activate().await;

        assert!(ctx.session.token().is_none());
        assert_eq!(controller.view().username, Username::Unknown);
        assert_eq!(controller.view().error, None);
    }

    #[tokio::test]
    async fn test_network_error_is_shown() {
        let mut api = MockBlogApi::new();
        api.expect_whoami().returning(|_| Err(ApiError::Network("refused".into())));

        let ctx = signed_in_context(api, 0).await;
        let controller = AccountController::new(ctx.clone());

        controller.on_activate().await;

        assert_eq!(controller.view().error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert!(ctx.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_dark_mode_and_picture() {
        let controller = AccountController::new(signed_in_context(MockBlogApi::new(), 0).await);

        assert!(controller.toggle_dark_mode().await);
        assert_eq!(controller.view().theme, ThemeName::Dark);

        controller.ctx.session.set_profile_picture(Some("file:///me.jpg".into())).await;
        assert_eq!(controller.view().profile_picture.as_deref(), Some("file:///me.jpg"));

        controller.delete_profile_picture().await;
        assert_eq!(controller.view().profile_picture, None);
    }

    #[tokio::test]
    async fn test_sign_out() {
        let ctx = signed_in_context(MockBlogApi::new(), 1).await;
        let controller = AccountController::new(ctx.clone());

        controller.sign_out().await;
        assert!(ctx.session.token().is_none());
    }

    #[tokio::test]
    async fn test_superseded_whoami_is_dropped() {
        let api = Arc::new(HeldApi::default());
        let controller = AccountController::new(signed_in_context_with(api.clone(), 0).await);

        tokio::join!(controller.on_activate(), controller.on_activate(), async {
            api.wait_for_calls(2).await;
            // The newer activation answers first, the older one last
            api.reply(1, Ok(serde_json::json!({"username": "new"})));
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            api.reply(0, Ok(serde_json::json!({"username": "old"})));
        });

        assert_eq!(controller.view().username, Username::Loaded("new".into()));
    }

    #[tokio::test]
    async fn test_rejection_after_deactivate_is_dropped() {
        let api = Arc::new(HeldApi::default());
        // Navigator expects no calls at all
        let ctx = signed_in_context_with(api.clone(), 0).await;
        let controller = AccountController::new(ctx.clone());

        tokio::join!(controller.on_activate(), async {
            api.wait_for_calls(1).await;
            controller.on_deactivate();
            api.reply(0, Err(ApiError::AuthRejected { status: 401 }));
        });

        assert_eq!(ctx.session.token().as_deref(), Some("abc"));
        assert_eq!(ctx.take_notice(), None);
        assert_eq!(controller.error_message(), None);
    }
}
