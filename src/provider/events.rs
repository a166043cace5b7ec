//! Push-notification channel for auth-state changes
//!
//! The provider emits session-changed events; consumers register listeners
//! and receive the current identity (or `None`) in arrival order. Each
//! subscription is a scoped handle: releasing it (explicitly or by drop)
//! guarantees the listener is never invoked again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::models::Identity;

/// Callback invoked with the current identity on every session change
pub type AuthStateListener = Box<dyn Fn(Option<Identity>) + Send + Sync>;

type ListenerMap = Mutex<HashMap<u64, AuthStateListener>>;

/// Registry of auth-state listeners owned by a provider client
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Arc<ListenerMap>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its subscription handle
    pub fn subscribe(&self, listener: AuthStateListener) -> AuthStateSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        AuthStateSubscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
            released: AtomicBool::new(false),
        }
    }

    /// Notify every registered listener of the current identity
    pub fn emit(&self, identity: Option<&Identity>) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            "emitting auth-state change to {} listener(s), authenticated: {}",
            listeners.len(),
            identity.is_some()
        );
        for listener in listeners.values() {
            listener(identity.cloned());
        }
    }

    /// Number of live listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle for a registered auth-state listener.
///
/// `unsubscribe` is idempotent and the handle releases its listener on drop,
/// so a mounted context cannot leak listeners across re-mounts.
pub struct AuthStateSubscription {
    id: u64,
    listeners: Weak<ListenerMap>,
    released: AtomicBool,
}

impl AuthStateSubscription {
    /// Remove the listener from the registry. Safe to call more than once;
    /// only the first call has any effect.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }

    /// Whether the listener is still registered
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::SeqCst)
    }
}

impl Drop for AuthStateSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
