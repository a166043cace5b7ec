//! Identity provider abstraction
//!
//! The application treats the hosted identity provider as an opaque
//! capability offering a fixed set of operations. [`IdentityProvider`] is
//! that capability as an object-safe trait; [`gotrue::GoTrueProvider`] is the
//! HTTP implementation against a GoTrue-style auth REST API. The push
//! notification channel (auth-state changes) lives in [`events`].

pub mod events;
pub mod gotrue;
pub mod pkce;

// Re-export commonly used items
pub use events::{AuthStateListener, AuthStateSubscription, ListenerRegistry};
pub use gotrue::GoTrueProvider;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Identity, IdentityMetadata, ProfileUpdate, ProviderSession};

/// Errors from identity provider operations.
///
/// `Provider` carries a structured, provider-reported message that is safe
/// to surface verbatim. Everything else is an unexpected failure whose
/// detail must stay in the logs.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider completed the call and reported a structured error
    #[error("{0}")]
    Provider(String),
    /// Transport-level failure (connect, timeout, malformed body)
    #[error("network failure: {0}")]
    Network(String),
    /// The provider client is misconfigured (bad URL, missing key)
    #[error("provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether the message is provider-reported and safe to show to users
    #[must_use]
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// The consumed identity provider surface.
///
/// One instance per process; the implementation owns the current session
/// and emits a push notification whenever it changes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate with email and password
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// Create a new account, attaching `metadata` to the identity record.
    ///
    /// Depending on provider configuration the account may require email
    /// confirmation, in which case no session is established yet.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: IdentityMetadata,
    ) -> Result<Identity, ProviderError>;

    /// Terminate the current session
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Fetch the identity for the current session, or `None` when anonymous
    async fn get_user(&self) -> Result<Option<Identity>, ProviderError>;

    /// Build the authorization URL for a redirect-based OAuth flow.
    ///
    /// The sign-in result arrives later through the callback exchange, not
    /// through this call.
    async fn sign_in_with_oauth(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> Result<String, ProviderError>;

    /// Request a password-reset email with the given return address
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError>;

    /// Merge the supplied fields into the identity metadata
    async fn update_user(&self, update: &ProfileUpdate) -> Result<Identity, ProviderError>;

    /// Exchange a provider-issued authorization code for a session
    async fn exchange_code_for_session(&self, code: &str)
        -> Result<ProviderSession, ProviderError>;

    /// Register a push listener invoked with the current identity whenever
    /// the underlying session changes. The returned handle must be released
    /// on teardown.
    fn on_auth_state_change(&self, listener: AuthStateListener) -> AuthStateSubscription;

    /// The session currently held by the client, if any
    fn current_session(&self) -> Option<ProviderSession>;
}
