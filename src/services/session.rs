//! # Session gate
//!
//! Decides whether the workspace is open. The state is an explicit machine
//! (see [`SessionState::apply`]) held in a `watch` channel and shared
//! through `AppState`.
//!
//! ```text
//! Anonymous ──login──▶ Authenticating ──session?──▶ Authenticated(Real)
//!     ▲                                  └─none───▶ Authenticated(Developer)
//!     └──────── logout / backend session gone ◀──────────┘
//! ```
//!
//! Developer access is a local bypass with no backend identity. It is
//! cleared on initial load and whenever the backend reports that no session
//! exists.

use crate::{backend::Backend, error::AppError};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Real,
    Developer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(AccessKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Result of the session lookup on startup.
    Restored { has_session: bool },
    /// The backend announced a session change.
    BackendChanged { has_session: bool },
    LoginStarted,
    LoginResolved { has_session: bool },
    LoggedOut,
}

impl SessionState {
    /// The transition table.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use AccessKind::*;
        use SessionState::*;

        match (self, event) {
            (_, SessionEvent::Restored { has_session: true }) => Authenticated(Real),
            (_, SessionEvent::Restored { has_session: false }) => Anonymous,
            (_, SessionEvent::BackendChanged { has_session: true }) => Authenticated(Real),
            (_, SessionEvent::BackendChanged { has_session: false }) => Anonymous,
            (_, SessionEvent::LoginStarted) => Authenticating,
            (Authenticating, SessionEvent::LoginResolved { has_session: true }) => {
                Authenticated(Real)
            }
            (Authenticating, SessionEvent::LoginResolved { has_session: false }) => {
                Authenticated(Developer)
            }
            // A late resolution after logout or a backend change is stale.
            (state, SessionEvent::LoginResolved { .. }) => state,
            (_, SessionEvent::LoggedOut) => Anonymous,
        }
    }

    /// `Authenticating` already counts: login opens the workspace
    /// optimistically.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, SessionState::Anonymous)
    }

    pub fn is_developer_access(self) -> bool {
        matches!(self, SessionState::Authenticated(AccessKind::Developer))
    }
}

pub struct SessionGate {
    backend: Arc<dyn Backend>,
    state: watch::Sender<SessionState>,
}

impl SessionGate {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self { backend, state }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn is_developer_access(&self) -> bool {
        self.state().is_developer_access()
    }

    fn apply(&self, event: SessionEvent) -> SessionState {
        let mut next = SessionState::Anonymous;
        self.state.send_if_modified(|state| {
            let previous = *state;
            *state = previous.apply(event);
            next = *state;
            if previous != next {
                tracing::debug!(?previous, ?next, ?event, "session state changed");
            }
            previous != next
        });
        next
    }

    /// Reverts a pending login. Leaves the state alone if anything else
    /// moved it out of `Authenticating` meanwhile.
    fn abandon_login(&self, previous: SessionState) {
        let target = match previous {
            SessionState::Authenticating => SessionState::Anonymous,
            other => other,
        };
        self.state.send_if_modified(|state| {
            if *state != SessionState::Authenticating {
                return false;
            }
            tracing::debug!(?target, "login abandoned");
            *state = target;
            true
        });
    }

    /// Startup: adopts an existing backend session, if any.
    pub async fn initialize(&self) -> Result<SessionState, AppError> {
        let has_session = self.backend.get_session().await?.is_some();
        Ok(self.apply(SessionEvent::Restored { has_session }))
    }

    /// Follows backend session changes until the returned handle is dropped.
    pub fn listen(self: &Arc<Self>) -> SessionSubscription {
        let mut changes = self.backend.on_session_change();
        let gate = Arc::clone(self);

        let task = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let has_session = changes.borrow_and_update().is_some();
                gate.apply(SessionEvent::BackendChanged { has_session });
            }
        });

        SessionSubscription { task }
    }

    /// Opens the workspace, then settles on real or developer access
    /// depending on whether the backend has a session.
    ///
    /// A failed session lookup puts the gate back where it was before the
    /// attempt.
    pub async fn login(&self) -> Result<SessionState, AppError> {
        let previous = self.state();
        self.apply(SessionEvent::LoginStarted);
        let has_session = match self.backend.get_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                self.abandon_login(previous);
                return Err(e.into());
            }
        };
        let state = self.apply(SessionEvent::LoginResolved { has_session });
        if state.is_developer_access() {
            tracing::info!("developer access granted");
        }
        Ok(state)
    }

    /// Developer access is dropped locally; a real session is signed out at
    /// the backend first.
    pub async fn logout(&self) -> Result<(), AppError> {
        if !self.is_developer_access() {
            self.backend.sign_out().await?;
        }
        self.apply(SessionEvent::LoggedOut);
        Ok(())
    }
}

/// Keeps the backend listener alive; aborts it on drop.
pub struct SessionSubscription {
    task: JoinHandle<()>,
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
