//! Create screen: edit a draft and submit it as a new post

use blog_api::PostDraft;
use parking_lot::Mutex;

use super::{Lifecycle, ScreenContext};
use crate::navigation::Route;
use crate::theme::ThemeName;

/// Result of [`CreateController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Post created; the index is shown if the screen is still active
    Created,
    /// Request failed, draft kept
    Failed,
    /// Session rejected, user sent to sign in
    SessionExpired,
    /// A submit was already in flight, or there is no session
    Ignored,
}

/// Everything the create screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateView {
    /// Current draft
    pub draft: PostDraft,
    /// Submit in flight
    pub submitting: bool,
    /// Active theme
    pub theme: ThemeName,
    /// User-visible error
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct CreateState {
    draft: PostDraft,
    submitting: bool,
    error: Option<String>,
}

/// Controller for the create screen
#[derive(Debug)]
pub struct CreateController {
    ctx: ScreenContext,
    lifecycle: Lifecycle,
    state: Mutex<CreateState>,
}

impl CreateController {
    /// Create a controller with an empty draft
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, lifecycle: Lifecycle::default(), state: Mutex::new(CreateState::default()) }
    }

    /// Screen mounted or regained focus
    pub fn on_activate(&self) {
        self.lifecycle.activate();
    }

    /// Screen lost focus or unmounted
    pub fn on_deactivate(&self) {
        self.lifecycle.deactivate();
    }

    /// Current view
    pub fn view(&self) -> CreateView {
        let state = self.state.lock();
        CreateView {
            draft: state.draft.clone(),
            submitting: state.submitting,
            theme: ThemeName::from_is_dark(self.ctx.session.is_dark()),
            error: state.error.clone(),
        }
    }

    /// Current draft
    pub fn draft(&self) -> PostDraft {
        self.state.lock().draft.clone()
    }

    /// Message from the last failed call, cleared by the next success
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Edit the title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().draft.title = title.into();
    }

    /// Edit the content
    pub fn set_content(&self, content: impl Into<String>) {
        self.state.lock().draft.content = content.into();
    }

    /// Send the draft as one request
    ///
    /// On success the submitted draft is discarded, even if the screen was
    /// left meanwhile, and the index is shown with the post as a hint while
    /// the screen is still active. Edits made during the request are kept.
    /// On failure the draft stays as it was.
    pub async fn submit(&self) -> SubmitOutcome {
        let snapshot = self.ctx.session.snapshot();
        let Some(token) = snapshot.token() else {
            return SubmitOutcome::Ignored;
        };

        let draft = {
            let mut state = self.state.lock();
            if state.submitting {
                return SubmitOutcome::Ignored;
            }
            state.submitting = true;
            state.draft.clone()
        };
        let activation = self.lifecycle.current();

        let result = self.ctx.api.create_post(token, &draft).await;
        self.state.lock().submitting = false;

        // Left the screen while the request was out
        let stale = activation.is_some_and(|id| !self.lifecycle.is_current(id));

        match result {
            Ok(created) => {
                tracing::info!(title = %draft.title, response = %created, "post created");
                {
                    let mut state = self.state.lock();
                    if state.draft == draft {
                        state.draft = PostDraft::default();
                    }
                    state.error = None;
                }
                if stale {
                    tracing::debug!("create screen left, not navigating");
                } else {
                    self.ctx.navigator.navigate(Route::Index { post: Some(draft) });
                }
                SubmitOutcome::Created
            }
            Err(_) if stale => {
                tracing::debug!("dropping stale create failure");
                SubmitOutcome::Ignored
            }
            Err(e) => match self.ctx.handle_error("create", &snapshot, &e).await {
                Some(message) => {
                    self.state.lock().error = Some(message);
                    SubmitOutcome::Failed
                }
                None => SubmitOutcome::SessionExpired,
            },
        }
    }

    /// Discard the draft and return to the index
    pub fn cancel(&self) {
        *self.state.lock() = CreateState::default();
        self.ctx.navigator.navigate(Route::Index { post: None });
    }
}
