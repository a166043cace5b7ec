//! Session store — the application's local view of the authenticated user
//!
//! A watch channel with exactly one writing side, held by the subscriber
//! context. All UI-facing consumers hold [`SessionReader`] clones. Writes
//! apply in arrival order; the last write wins.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Identity;

/// The derived, ephemeral session value.
///
/// `loading` is `true` only between process start and the initial identity
/// fetch; once resolved it never returns to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl Session {
    /// Initial state before the first identity fetch resolves
    #[must_use]
    pub fn loading() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    /// A resolved state carrying the given identity (or anonymous)
    #[must_use]
    pub fn resolved(identity: Option<Identity>) -> Self {
        Self {
            identity,
            loading: false,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::resolved(None)
    }

    /// Strictly "identity is present"
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Writing side of the session store
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create a store in the loading state together with its first reader
    #[must_use]
    pub fn new() -> (Self, SessionReader) {
        let (tx, rx) = watch::channel(Session::loading());
        (Self { tx: Arc::new(tx) }, SessionReader { rx })
    }

    /// Overwrite the stored session. Readers observe writes in order.
    pub fn write(&self, session: Session) {
        // send only fails when every reader is gone; nothing to observe then
        let _ = self.tx.send(session);
    }

    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only handle onto the session store
#[derive(Clone)]
pub struct SessionReader {
    rx: watch::Receiver<Session>,
}

impl SessionReader {
    /// Snapshot of the current session value
    #[must_use]
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// Wait until the initial fetch has resolved, then return the session.
    /// Returns immediately once `loading` is `false`.
    pub async fn resolved(&self) -> Session {
        let mut rx = self.rx.clone();
        let session = match rx.wait_for(|session| !session.loading).await {
            Ok(session) => session.clone(),
            // Writer gone; the last observed value stands
            Err(_) => self.current(),
        };
        session
    }
}
