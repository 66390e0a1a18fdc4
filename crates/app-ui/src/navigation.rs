//! Navigation for Pocket Blog
//!
//! Two root stacks exist: `SignInSignUp` for signed-out users and `LoggedIn`
//! holding the app's screens. Controllers request navigation through the
//! [`Navigator`] trait; [`NavigationState`] is the in-memory model the
//! rendering layer reads.

use app_state::Flow;
use blog_api::PostDraft;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Route Definitions
// =============================================================================

/// Root stack a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootStack {
    /// Signed-out stack
    SignInSignUp,
    /// Signed-in stack
    LoggedIn,
}

impl RootStack {
    /// Stack shown for a flow
    pub fn for_flow(flow: Flow) -> Self {
        match flow {
            Flow::Unauthenticated => RootStack::SignInSignUp,
            Flow::Authenticated => RootStack::LoggedIn,
        }
    }

    /// Destination name
    pub fn name(&self) -> &'static str {
        match self {
            RootStack::SignInSignUp => "SignInSignUp",
            RootStack::LoggedIn => "LoggedIn",
        }
    }
}

/// All destinations in the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "params")]
pub enum Route {
    /// Sign-in / sign-up form
    SignInSignUp,
    /// Post listing
    Index {
        /// Just-created post shown before the server list includes it
        #[serde(skip_serializing_if = "Option::is_none")]
        post: Option<PostDraft>,
    },
    /// Post creation form
    Create,
    /// Post editing
    Edit,
    /// Account and settings
    Account,
    /// Profile picture capture
    Camera,
}

impl Route {
    /// Entry route of a flow
    pub fn entry_for(flow: Flow) -> Self {
        match flow {
            Flow::Unauthenticated => Route::SignInSignUp,
            Flow::Authenticated => Route::Index { post: None },
        }
    }

    /// Destination name
    pub fn name(&self) -> &'static str {
        match self {
            Route::SignInSignUp => "SignInSignUp",
            Route::Index { .. } => "Index",
            Route::Create => "Create",
            Route::Edit => "Edit",
            Route::Account => "Account",
            Route::Camera => "Camera",
        }
    }

    /// Root stack containing this route
    pub fn root(&self) -> RootStack {
        match self {
            Route::SignInSignUp => RootStack::SignInSignUp,
            _ => RootStack::LoggedIn,
        }
    }

    /// Check if this route requires authentication
    pub fn requires_auth(&self) -> bool {
        self.root() == RootStack::LoggedIn
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Accepts navigation requests from screen controllers
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Go to `route`
    fn navigate(&self, route: Route);
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self { route, key: uuid::Uuid::new_v4().to_string() }
    }
}

/// Navigation state: the active root stack and its entries
///
/// `navigate` follows "navigate, don't duplicate" semantics: going to a
/// route already on the stack pops back to it and updates its params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    root: RootStack,
    /// Stack entries (bottom to top), never empty
    entries: Vec<StackEntry>,
}

impl NavigationState {
    /// State showing the entry route of `flow`
    pub fn for_flow(flow: Flow) -> Self {
        let route = Route::entry_for(flow);
        Self { root: route.root(), entries: vec![StackEntry::new(route)] }
    }

    /// Active root stack
    pub fn root(&self) -> RootStack {
        self.root
    }

    /// Get the current (top) route
    pub fn current(&self) -> &Route {
        // `entries` is never empty
        &self.entries[self.entries.len() - 1].route
    }

    /// Get all entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Go to `route`, switching root stacks if needed
    pub fn navigate(&mut self, route: Route) {
        if route.root() != self.root {
            self.reset(route);
            return;
        }

        if let Some(pos) = self.entries.iter().position(|e| e.route.name() == route.name()) {
            self.entries.truncate(pos + 1);
            self.entries[pos].route = route;
        } else {
            self.entries.push(StackEntry::new(route));
        }
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn go_back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Replace everything with a single route
    pub fn reset(&mut self, route: Route) {
        self.root = route.root();
        self.entries = vec![StackEntry::new(route)];
    }

    /// Show the entry route of `flow` unless that root is already active
    pub fn apply_flow(&mut self, flow: Flow) {
        if self.root != RootStack::for_flow(flow) {
            self.reset(Route::entry_for(flow));
        }
    }
}

/// Thread-safe [`NavigationState`] usable as a [`Navigator`]
///
/// Keeps a log of every requested route.
#[derive(Debug, Clone)]
pub struct SharedNavigation {
    state: Arc<Mutex<NavigationState>>,
    history: Arc<Mutex<Vec<Route>>>,
}

impl SharedNavigation {
    /// Start at the entry route of `flow`
    pub fn new(flow: Flow) -> Self {
        Self {
            state: Arc::new(Mutex::new(NavigationState::for_flow(flow))),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of the current state
    pub fn state(&self) -> NavigationState {
        self.state.lock().clone()
    }

    /// Current route
    pub fn current(&self) -> Route {
        self.state.lock().current().clone()
    }

    /// Every route requested through [`Navigator::navigate`], oldest first
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }

    /// Switch root stacks for a gate transition
    pub fn apply_flow(&self, flow: Flow) {
        self.state.lock().apply_flow(flow);
    }

    /// Pop the top route
    pub fn go_back(&self) -> bool {
        self.state.lock().go_back()
    }
}

impl Navigator for SharedNavigation {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = route.name(), "navigate");
        self.history.lock().push(route.clone());
        self.state.lock().navigate(route);
    }
}
