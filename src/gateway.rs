//! Auth gateway — façade over the identity provider
//!
//! Every operation wraps one provider call and normalizes its outcome into
//! a uniform shape. Provider-reported failures are surfaced verbatim;
//! unexpected failures become a fixed fallback message and the raw detail
//! stays in the logs. Nothing here ever panics or propagates an error type
//! to the caller.

use std::sync::Arc;

use crate::models::{
    AuthResult, Identity, IdentityMetadata, ProfileUpdate, ProviderSession, RegisterData,
};
use crate::provider::{AuthStateSubscription, IdentityProvider, ProviderError};

/// Path appended to the redirect base for the OAuth return address
pub const OAUTH_CALLBACK_PATH: &str = "/auth/callback";
/// Path appended to the redirect base for password-reset return links
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

// Fixed fallback messages for unexpected failures, one per operation
const LOGIN_FALLBACK: &str = "Unexpected error during login";
const REGISTER_FALLBACK: &str = "Unexpected error during registration";
const LOGOUT_FALLBACK: &str = "Unexpected error during logout";
const GOOGLE_FALLBACK: &str = "Error with Google OAuth";
const RESET_FALLBACK: &str = "Error sending reset email";
const PROFILE_FALLBACK: &str = "Error updating profile";
const EXCHANGE_FALLBACK: &str = "Unexpected error during code exchange";

pub struct AuthGateway {
    provider: Arc<dyn IdentityProvider>,
    redirect_base_url: String,
}

impl AuthGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>, redirect_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            redirect_base_url: redirect_base_url.into(),
        }
    }

    /// Surface a provider error as a user-facing message: verbatim when the
    /// provider reported it, the operation's fallback otherwise.
    fn surface(error: ProviderError, fallback: &str) -> String {
        if error.is_reported() {
            error.to_string()
        } else {
            log::error!("unexpected provider failure: {error}");
            fallback.to_string()
        }
    }

    /// Authenticate with email and password
    pub async fn login(&self, email: &str, password: &str) -> AuthResult {
        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => AuthResult::ok(session.identity),
            Err(error) => AuthResult::err(Self::surface(error, LOGIN_FALLBACK)),
        }
    }

    /// Create an account, attaching the name as identity metadata.
    ///
    /// Password-confirmation and length validation are caller responsibility
    /// and must happen before this call.
    pub async fn register(&self, data: &RegisterData) -> AuthResult {
        let metadata = IdentityMetadata {
            name: Some(data.name.clone()),
            avatar_url: None,
        };
        match self
            .provider
            .sign_up(&data.email, &data.password, metadata)
            .await
        {
            Ok(identity) => AuthResult::ok(identity),
            Err(error) => AuthResult::err(Self::surface(error, REGISTER_FALLBACK)),
        }
    }

    /// Request session termination from the provider
    pub async fn logout(&self) -> Result<(), String> {
        self.provider
            .sign_out()
            .await
            .map_err(|error| Self::surface(error, LOGOUT_FALLBACK))
    }

    /// Current identity, or `None` when anonymous. Never fails; provider
    /// errors are logged and treated as anonymous.
    pub async fn get_current_user(&self) -> Option<Identity> {
        match self.provider.get_user().await {
            Ok(identity) => identity,
            Err(error) => {
                log::error!("error getting current user: {error}");
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_current_user().await.is_some()
    }

    /// Initiate the redirect-based Google OAuth flow. Returns the provider
    /// authorization URL; the sign-in result arrives later via the callback
    /// handler.
    pub async fn sign_in_with_google(&self) -> Result<String, String> {
        let redirect_to = format!("{}{}", self.redirect_base_url, OAUTH_CALLBACK_PATH);
        self.provider
            .sign_in_with_oauth("google", &redirect_to)
            .await
            .map_err(|error| Self::surface(error, GOOGLE_FALLBACK))
    }

    /// Request a password-reset email
    pub async fn reset_password(&self, email: &str) -> Result<(), String> {
        let redirect_to = format!("{}{}", self.redirect_base_url, RESET_PASSWORD_PATH);
        self.provider
            .reset_password_for_email(email, &redirect_to)
            .await
            .map_err(|error| Self::surface(error, RESET_FALLBACK))
    }

    /// Merge profile fields into the identity metadata
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), String> {
        self.provider
            .update_user(update)
            .await
            .map(|_| ())
            .map_err(|error| Self::surface(error, PROFILE_FALLBACK))
    }

    /// Exchange an authorization code for a provider session
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderSession, String> {
        self.provider
            .exchange_code_for_session(code)
            .await
            .map_err(|error| Self::surface(error, EXCHANGE_FALLBACK))
    }

    /// Register a push listener for auth-state changes. The handle must be
    /// released on teardown to avoid leaking listeners.
    pub fn on_auth_state_change(
        &self,
        callback: impl Fn(Option<Identity>) + Send + Sync + 'static,
    ) -> AuthStateSubscription {
        self.provider.on_auth_state_change(Box::new(callback))
    }

    /// The provider session currently held by the client, if any
    pub fn current_session(&self) -> Option<ProviderSession> {
        self.provider.current_session()
    }
}
