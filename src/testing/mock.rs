//! Scriptable in-memory identity provider
//!
//! Mirrors the real client's observable behavior: successful operations
//! update the held session and emit a push notification; scripted failures
//! leave it untouched. Every call is recorded so tests can assert which
//! provider operations ran.

use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::models::{Identity, IdentityMetadata, ProfileUpdate, ProviderSession};
use crate::provider::{
    AuthStateListener, AuthStateSubscription, IdentityProvider, ListenerRegistry, ProviderError,
};

use super::fixtures::{test_identity, test_session};

pub struct MockProvider {
    registry: ListenerRegistry,
    session: RwLock<Option<ProviderSession>>,
    login_error: Option<ProviderError>,
    sign_up_error: Option<ProviderError>,
    sign_out_error: Option<ProviderError>,
    get_user_result: Result<Option<Identity>, ProviderError>,
    oauth_error: Option<ProviderError>,
    exchange_error: Option<ProviderError>,
    calls: Mutex<Vec<&'static str>>,
    last_signup_metadata: Mutex<Option<IdentityMetadata>>,
    last_oauth_redirect: Mutex<Option<String>>,
    last_reset_redirect: Mutex<Option<String>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A provider where every operation succeeds and `get_user` reports
    /// anonymous.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ListenerRegistry::new(),
            session: RwLock::new(None),
            login_error: None,
            sign_up_error: None,
            sign_out_error: None,
            get_user_result: Ok(None),
            oauth_error: None,
            exchange_error: None,
            calls: Mutex::new(Vec::new()),
            last_signup_metadata: Mutex::new(None),
            last_oauth_redirect: Mutex::new(None),
            last_reset_redirect: Mutex::new(None),
        }
    }

    /// Script `sign_in_with_password` to fail with a provider-reported
    /// message.
    #[must_use]
    pub fn with_login_error(mut self, message: &str) -> Self {
        self.login_error = Some(ProviderError::Provider(message.to_string()));
        self
    }

    /// Script `sign_in_with_password` to fail at the transport level
    #[must_use]
    pub fn with_login_network_failure(mut self) -> Self {
        self.login_error = Some(ProviderError::Network("connection reset".to_string()));
        self
    }

    #[must_use]
    pub fn with_sign_up_error(mut self, message: &str) -> Self {
        self.sign_up_error = Some(ProviderError::Provider(message.to_string()));
        self
    }

    #[must_use]
    pub fn with_sign_out_error(mut self, message: &str) -> Self {
        self.sign_out_error = Some(ProviderError::Provider(message.to_string()));
        self
    }

    /// Script the identity `get_user` reports
    #[must_use]
    pub fn with_user(mut self, identity: Option<Identity>) -> Self {
        self.get_user_result = Ok(identity);
        self
    }

    /// Script `get_user` to fail at the transport level
    #[must_use]
    pub fn with_get_user_failure(mut self) -> Self {
        self.get_user_result = Err(ProviderError::Network("connection reset".to_string()));
        self
    }

    #[must_use]
    pub fn with_oauth_error(mut self, message: &str) -> Self {
        self.oauth_error = Some(ProviderError::Provider(message.to_string()));
        self
    }

    #[must_use]
    pub fn with_exchange_error(mut self, message: &str) -> Self {
        self.exchange_error = Some(ProviderError::Provider(message.to_string()));
        self
    }

    /// Emit a push notification as the hosted provider would, e.g. on
    /// session expiry or a sign-in from another tab.
    pub fn push_state(&self, identity: Option<Identity>) {
        *self.session.write().unwrap() = identity
            .clone()
            .map(test_session);
        self.registry.emit(identity.as_ref());
    }

    /// Names of the provider operations invoked so far, in call order
    pub fn recorded_calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_signup_metadata(&self) -> Option<IdentityMetadata> {
        self.last_signup_metadata.lock().unwrap().clone()
    }

    pub fn last_oauth_redirect(&self) -> Option<String> {
        self.last_oauth_redirect.lock().unwrap().clone()
    }

    pub fn last_reset_redirect(&self) -> Option<String> {
        self.last_reset_redirect.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn establish(&self, session: ProviderSession) -> ProviderSession {
        *self.session.write().unwrap() = Some(session.clone());
        self.registry.emit(Some(&session.identity));
        session
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        self.record("sign_in_with_password");
        if let Some(error) = &self.login_error {
            return Err(error.clone());
        }
        Ok(self.establish(test_session(test_identity())))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: IdentityMetadata,
    ) -> Result<Identity, ProviderError> {
        self.record("sign_up");
        *self.last_signup_metadata.lock().unwrap() = Some(metadata.clone());
        if let Some(error) = &self.sign_up_error {
            return Err(error.clone());
        }
        // Confirmation-pending account: an identity exists but no session yet
        Ok(Identity {
            id: "new-user-456".to_string(),
            email: Some(email.to_string()),
            metadata,
        })
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.record("sign_out");
        if let Some(error) = &self.sign_out_error {
            return Err(error.clone());
        }
        *self.session.write().unwrap() = None;
        self.registry.emit(None);
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<Identity>, ProviderError> {
        self.record("get_user");
        self.get_user_result.clone()
    }

    async fn sign_in_with_oauth(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> Result<String, ProviderError> {
        self.record("sign_in_with_oauth");
        *self.last_oauth_redirect.lock().unwrap() = Some(redirect_to.to_string());
        if let Some(error) = &self.oauth_error {
            return Err(error.clone());
        }
        Ok(format!(
            "https://provider.test/auth/v1/authorize?provider={provider}&redirect_to={}",
            urlencoding::encode(redirect_to)
        ))
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        self.record("reset_password_for_email");
        *self.last_reset_redirect.lock().unwrap() = Some(redirect_to.to_string());
        Ok(())
    }

    async fn update_user(&self, update: &ProfileUpdate) -> Result<Identity, ProviderError> {
        self.record("update_user");
        let mut identity = self
            .session
            .read()
            .unwrap()
            .as_ref()
            .map_or_else(test_identity, |session| session.identity.clone());
        if let Some(name) = &update.name {
            identity.metadata.name = Some(name.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            identity.metadata.avatar_url = Some(avatar_url.clone());
        }
        self.registry.emit(Some(&identity));
        Ok(identity)
    }

    async fn exchange_code_for_session(
        &self,
        _code: &str,
    ) -> Result<ProviderSession, ProviderError> {
        self.record("exchange_code_for_session");
        if let Some(error) = &self.exchange_error {
            return Err(error.clone());
        }
        Ok(self.establish(test_session(test_identity())))
    }

    fn on_auth_state_change(&self, listener: AuthStateListener) -> AuthStateSubscription {
        self.registry.subscribe(listener)
    }

    fn current_session(&self) -> Option<ProviderSession> {
        self.session.read().unwrap().clone()
    }
}
