//! Session gate
//!
//! Chooses between the signed-out and signed-in flows from the session token
//! alone. The gate holds a watch receiver, so [`SessionGate::flow`] always
//! reflects the latest token and [`SessionGate::changed`] wakes on every
//! flow transition without polling.

use tokio::sync::watch;

use crate::session::{SessionSnapshot, SessionStore};

/// Which top-level flow is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Sign-in / sign-up
    Unauthenticated,
    /// The tab stack behind authentication
    Authenticated,
}

impl Flow {
    /// Flow for a session snapshot
    pub fn for_snapshot(snapshot: &SessionSnapshot) -> Self {
        if snapshot.is_authenticated() {
            Flow::Authenticated
        } else {
            Flow::Unauthenticated
        }
    }
}

/// Reactive top-level router
#[derive(Debug)]
pub struct SessionGate {
    session_rx: watch::Receiver<SessionSnapshot>,
    rendered: Flow,
}

impl SessionGate {
    /// Mount the gate on a store
    pub fn new(store: &SessionStore) -> Self {
        let mut session_rx = store.subscribe();
        let rendered = Flow::for_snapshot(&session_rx.borrow_and_update());
        tracing::debug!(?rendered, "session gate mounted");
        Self { session_rx, rendered }
    }

    /// The flow the current token selects
    pub fn flow(&self) -> Flow {
        Flow::for_snapshot(&self.session_rx.borrow())
    }

    /// The flow last returned by [`Self::changed`] (or chosen at mount)
    pub fn rendered(&self) -> Flow {
        self.rendered
    }

    /// Wait for the next flow transition
    ///
    /// Token changes that keep the same flow (e.g. a re-login while already
    /// signed in) do not resolve this. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Flow> {
        loop {
            // A pending change that already matches the rendered flow is skipped
            let flow = Flow::for_snapshot(&self.session_rx.borrow_and_update());
            if flow != self.rendered {
                tracing::info!(from = ?self.rendered, to = ?flow, "switching flow");
                self.rendered = flow;
                return Some(flow);
            }
            self.session_rx.changed().await.ok()?;
        }
    }

    /// Drive `on_change` for every transition until the store is dropped
    ///
    /// `on_change` is called once immediately with the mount-time flow.
    pub async fn run<F>(mut self, mut on_change: F)
    where
        F: FnMut(Flow) + Send,
    {
        on_change(self.rendered);
        while let Some(flow) = self.changed().await {
            on_change(flow);
        }
    }
}
