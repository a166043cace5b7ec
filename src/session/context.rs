//! Auth-state subscriber — exclusive owner of the session store
//!
//! On startup the context registers one push listener with the gateway and
//! kicks off the initial identity fetch. Both write through the same store;
//! no ordering is enforced between them and the last write wins. Teardown
//! releases the listener exactly once.

use std::sync::{Arc, Mutex, PoisonError};

use crate::gateway::AuthGateway;
use crate::provider::AuthStateSubscription;
use crate::session::store::{Session, SessionReader, SessionStore};

pub struct SessionContext {
    gateway: Arc<AuthGateway>,
    store: SessionStore,
    reader: SessionReader,
    subscription: Mutex<Option<AuthStateSubscription>>,
}

impl SessionContext {
    /// Start the subscriber: register the push listener and spawn the
    /// initial identity fetch.
    pub fn start(gateway: Arc<AuthGateway>) -> Arc<Self> {
        let (store, reader) = SessionStore::new();

        // Push notifications overwrite the store and force loading off
        let subscription = gateway.on_auth_state_change({
            let store = store.clone();
            move |identity| store.write(Session::resolved(identity))
        });

        // Initial fetch; may resolve before or after the first push
        tokio::spawn({
            let gateway = Arc::clone(&gateway);
            let store = store.clone();
            async move {
                let identity = gateway.get_current_user().await;
                store.write(Session::resolved(identity));
            }
        });

        Arc::new(Self {
            gateway,
            store,
            reader,
            subscription: Mutex::new(Some(subscription)),
        })
    }

    /// Snapshot of the current session
    #[must_use]
    pub fn session(&self) -> Session {
        self.reader.current()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.reader.is_authenticated()
    }

    /// Wait until the initial fetch has resolved
    pub async fn resolved(&self) -> Session {
        self.reader.resolved().await
    }

    /// A read-only handle for other consumers
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        self.store.reader()
    }

    /// Log out via the gateway. Only on success is the stored identity
    /// cleared locally, so the UI reflects the logged-out state before any
    /// push notification arrives.
    pub async fn logout(&self) -> Result<(), String> {
        self.gateway.logout().await?;
        self.store.write(Session::anonymous());
        Ok(())
    }

    /// Release the push listener. Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        if let Some(subscription) = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            subscription.unsubscribe();
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
