//! Index screen: the post listing

use blog_api::{Post, PostDraft};
use parking_lot::Mutex;

use super::{Lifecycle, ScreenContext};
use crate::theme::ThemeName;

/// Everything the index screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView {
    /// Posts to show, a pending hint first
    pub posts: Vec<Post>,
    /// Request in flight
    pub loading: bool,
    /// Active theme
    pub theme: ThemeName,
    /// User-visible error
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct IndexState {
    posts: Vec<Post>,
    /// Created post the server list does not contain yet
    pending: Option<PostDraft>,
    loading: bool,
    error: Option<String>,
}

impl IndexState {
    fn drop_confirmed_hint(&mut self) {
        if let Some(draft) = &self.pending {
            if self.posts.iter().any(|p| p.matches_draft(draft)) {
                self.pending = None;
            }
        }
    }
}

/// Controller for the index screen
#[derive(Debug)]
pub struct IndexController {
    ctx: ScreenContext,
    lifecycle: Lifecycle,
    state: Mutex<IndexState>,
}

impl IndexController {
    /// Create a controller
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, lifecycle: Lifecycle::default(), state: Mutex::new(IndexState::default()) }
    }

    /// Screen mounted or regained focus: refetch the list
    ///
    /// `hint` is the `post` param of [`crate::Route::Index`].
    pub async fn on_activate(&self, hint: Option<PostDraft>) {
        let activation = self.lifecycle.activate();
        let snapshot = self.ctx.session.snapshot();

        {
            let mut state = self.state.lock();
            if hint.is_some() {
                state.pending = hint;
            }
        }

        let Some(token) = snapshot.token() else {
            return;
        };

        self.state.lock().loading = true;
        let result = self.ctx.api.list_posts(token).await;

        if !self.lifecycle.is_current(activation) {
            tracing::debug!("dropping stale post list");
            return;
        }

        match result {
            Ok(posts) => {
                let mut state = self.state.lock();
                state.posts = posts;
                state.loading = false;
                state.error = None;
                state.drop_confirmed_hint();
            }
            Err(e) => {
                let message = self.ctx.handle_error("index", &snapshot, &e).await;
                let mut state = self.state.lock();
                state.loading = false;
                state.error = message;
            }
        }
    }

    /// Message from the last failed call, cleared by the next success
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Screen lost focus or unmounted
    pub fn on_deactivate(&self) {
        self.lifecycle.deactivate();
        self.state.lock().loading = false;
    }

    /// Current view
    pub fn view(&self) -> IndexView {
        let state = self.state.lock();
        let mut posts = Vec::with_capacity(state.posts.len() + 1);
        if let Some(draft) = &state.pending {
            posts.push(Post::from(draft.clone()));
        }
        posts.extend(state.posts.iter().cloned());

        IndexView {
            posts,
            loading: state.loading,
            theme: ThemeName::from_is_dark(self.ctx.session.is_dark()),
            error: state.error.clone(),
        }
    }
}
