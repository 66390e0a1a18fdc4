//! Application composition

use app_state::{Flow, SessionGate, SessionStore};
use app_ui::{
    AccountController, CreateController, EditController, IndexController, ScreenContext,
    SharedNavigation, SignInController,
};
use blog_api::{ApiClient, BlogApi};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{AppConfig, Result};

/// A running client: session, API, navigation, and one controller per screen
///
/// Must be created inside a Tokio runtime; the session gate runs as a task
/// that switches root stacks whenever the session flips.
pub struct App {
    session: SessionStore,
    navigation: SharedNavigation,
    context: ScreenContext,
    sign_in: SignInController,
    account: AccountController,
    create: CreateController,
    edit: EditController,
    index: IndexController,
    gate_task: JoinHandle<()>,
}

impl App {
    /// Open the session store and connect to the configured backend
    pub async fn start(config: AppConfig) -> Result<Self> {
        let session = SessionStore::open(config.session).await?;
        let api = ApiClient::new(config.api)?;
        tracing::info!(base_url = %api.base_url(), "starting pocket blog");
        Ok(Self::with_api(session, Arc::new(api)))
    }

    /// Assemble an app around an existing store and API
    pub fn with_api(session: SessionStore, api: Arc<dyn BlogApi>) -> Self {
        let gate = SessionGate::new(&session);
        let navigation = SharedNavigation::new(gate.rendered());

        let gate_navigation = navigation.clone();
        let gate_task = tokio::spawn(gate.run(move |flow| gate_navigation.apply_flow(flow)));

        let context = ScreenContext::new(session.clone(), api, Arc::new(navigation.clone()));

        Self {
            sign_in: SignInController::new(context.clone()),
            account: AccountController::new(context.clone()),
            create: CreateController::new(context.clone()),
            edit: EditController::new(context.clone()),
            index: IndexController::new(context.clone()),
            session,
            navigation,
            context,
            gate_task,
        }
    }

    /// Session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Flow the current token selects
    pub fn flow(&self) -> Flow {
        if self.session.is_authenticated() {
            Flow::Authenticated
        } else {
            Flow::Unauthenticated
        }
    }

    /// Navigation state and history
    pub fn navigation(&self) -> &SharedNavigation {
        &self.navigation
    }

    /// Shared controller dependencies
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Sign-in / sign-up screen
    pub fn sign_in(&self) -> &SignInController {
        &self.sign_in
    }

    /// Account screen
    pub fn account(&self) -> &AccountController {
        &self.account
    }

    /// Create screen
    pub fn create(&self) -> &CreateController {
        &self.create
    }

    /// Edit screen
    pub fn edit(&self) -> &EditController {
        &self.edit
    }

    /// Index screen
    pub fn index(&self) -> &IndexController {
        &self.index
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.gate_task.abort();
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}
