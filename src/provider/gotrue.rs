//! HTTP identity provider client for a GoTrue-style hosted auth API
//!
//! One client per process. It holds the current provider session, mirrors
//! the provider's REST surface one-to-one and emits an auth-state push to
//! registered listeners whenever that session changes. No retry or backoff
//! is performed around provider calls.

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::{PoisonError, RwLock};
use url::Url;

use super::{
    pkce, AuthStateListener, AuthStateSubscription, IdentityProvider, ListenerRegistry,
    ProviderError,
};
use crate::models::{Identity, IdentityMetadata, ProfileUpdate, ProviderSession};
use crate::settings::AuthrelaySettings;
use async_trait::async_trait;

/// Shared HTTP client; connection pooling across all provider calls
static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Applied when the provider omits `expires_in` from a token response
const DEFAULT_SESSION_LIFETIME_SECS: i64 = 3600;

pub struct GoTrueProvider {
    /// Provider base URL without trailing slash
    base_url: String,
    anon_key: String,
    session: RwLock<Option<ProviderSession>>,
    /// PKCE verifier held between flow initiation and code exchange
    pkce_verifier: RwLock<Option<String>>,
    registry: ListenerRegistry,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self) -> ProviderSession {
        let lifetime = self.expires_in.unwrap_or(DEFAULT_SESSION_LIFETIME_SECS);
        ProviderSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
            identity: self.user,
        }
    }
}

/// Sign-up responses come in two shapes: a token response when the account
/// is usable immediately, or the bare user record when email confirmation
/// is still pending.
#[derive(Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<Identity>,
    id: Option<String>,
    email: Option<String>,
    #[serde(default)]
    user_metadata: IdentityMetadata,
}

impl GoTrueProvider {
    /// Create a client for the given provider URL and anon key
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ProviderError> {
        let parsed = Url::parse(url)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider URL: {e}")))?;
        if anon_key.is_empty() {
            return Err(ProviderError::Configuration(
                "provider anon key is empty".to_string(),
            ));
        }
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            pkce_verifier: RwLock::new(None),
            registry: ListenerRegistry::new(),
        })
    }

    pub fn from_settings(settings: &AuthrelaySettings) -> Result<Self, ProviderError> {
        let anon_key = settings.provider.resolve_anon_key().ok_or_else(|| {
            ProviderError::Configuration("no provider anon key configured".to_string())
        })?;
        Self::new(&settings.provider.url, &anon_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn store_session(&self, session: Option<ProviderSession>) {
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    fn refresh_identity(&self, identity: &Identity) {
        if let Some(session) = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            session.identity = identity.clone();
        }
    }
}

fn network(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.to_string())
}

/// Turn a non-success provider response into a reported error, preserving
/// the provider's own message when the body carries one.
async fn reported_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Provider(extract_error_message(&body, status))
}

fn extract_error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(key).and_then(serde_json::Value::as_str) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    format!("provider returned status {status}")
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let response = HTTP_CLIENT
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(reported_error(response).await);
        }

        let token: TokenResponse = response.json().await.map_err(network)?;
        let session = token.into_session();
        self.store_session(Some(session.clone()));
        self.registry.emit(Some(&session.identity));
        log::info!("password sign-in succeeded for user {}", session.identity.id);
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: IdentityMetadata,
    ) -> Result<Identity, ProviderError> {
        let response = HTTP_CLIENT
            .post(self.endpoint("/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(reported_error(response).await);
        }

        let body: SignUpResponse = response.json().await.map_err(network)?;
        let identity = if let Some(user) = body.user {
            user
        } else if let Some(id) = body.id {
            Identity {
                id,
                email: body.email,
                metadata: body.user_metadata,
            }
        } else {
            return Err(ProviderError::Provider(
                "Registration response did not include a user record".to_string(),
            ));
        };

        // A session only exists when email confirmation is disabled
        if let Some(access_token) = body.access_token {
            let lifetime = body.expires_in.unwrap_or(DEFAULT_SESSION_LIFETIME_SECS);
            self.store_session(Some(ProviderSession {
                access_token,
                refresh_token: body.refresh_token,
                expires_at: Utc::now() + Duration::seconds(lifetime),
                identity: identity.clone(),
            }));
            self.registry.emit(Some(&identity));
        }
        log::info!("registration succeeded for user {}", identity.id);
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let Some(token) = self.access_token() else {
            // No session to terminate
            return Ok(());
        };
        let response = HTTP_CLIENT
            .post(self.endpoint("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(network)?;

        // 401 means the provider already considers the session gone
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            self.store_session(None);
            self.registry.emit(None);
            Ok(())
        } else {
            Err(reported_error(response).await)
        }
    }

    async fn get_user(&self) -> Result<Option<Identity>, ProviderError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };
        let response = HTTP_CLIENT
            .get(self.endpoint("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(network)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Stale or revoked token; treat as anonymous
            self.store_session(None);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(reported_error(response).await);
        }

        let identity: Identity = response.json().await.map_err(network)?;
        self.refresh_identity(&identity);
        Ok(Some(identity))
    }

    async fn sign_in_with_oauth(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> Result<String, ProviderError> {
        if provider.is_empty() {
            return Err(ProviderError::Configuration(
                "OAuth provider name is empty".to_string(),
            ));
        }
        let verifier = pkce::generate_verifier();
        let challenge = pkce::compute_challenge(&verifier);
        *self
            .pkce_verifier
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(verifier);

        Ok(format!(
            "{}?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            self.endpoint("/authorize"),
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            challenge
        ))
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        let path = format!("/recover?redirect_to={}", urlencoding::encode(redirect_to));
        let response = HTTP_CLIENT
            .post(self.endpoint(&path))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(network)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(reported_error(response).await)
        }
    }

    async fn update_user(&self, update: &ProfileUpdate) -> Result<Identity, ProviderError> {
        let Some(token) = self.access_token() else {
            return Err(ProviderError::Provider("Not authenticated".to_string()));
        };
        let response = HTTP_CLIENT
            .put(self.endpoint("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .json(&json!({ "data": update }))
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(reported_error(response).await);
        }

        let identity: Identity = response.json().await.map_err(network)?;
        self.refresh_identity(&identity);
        self.registry.emit(Some(&identity));
        Ok(identity)
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let verifier = self
            .pkce_verifier
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let mut payload = json!({ "auth_code": code });
        if let Some(verifier) = verifier {
            payload["code_verifier"] = verifier.into();
        }

        let response = HTTP_CLIENT
            .post(self.endpoint("/token?grant_type=pkce"))
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(reported_error(response).await);
        }

        let token: TokenResponse = response.json().await.map_err(network)?;
        let session = token.into_session();
        self.store_session(Some(session.clone()));
        self.registry.emit(Some(&session.identity));
        log::info!(
            "code exchange succeeded for user {}",
            session.identity.id
        );
        Ok(session)
    }

    fn on_auth_state_change(&self, listener: AuthStateListener) -> AuthStateSubscription {
        self.registry.subscribe(listener)
    }

    fn current_session(&self) -> Option<ProviderSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoTrueProvider {
        GoTrueProvider::new("https://project.example.co/", "anon-key").unwrap()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(GoTrueProvider::new("not a url", "key").is_err());
        assert!(GoTrueProvider::new("https://project.example.co", "").is_err());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let p = provider();
        assert_eq!(
            p.endpoint("/token?grant_type=password"),
            "https://project.example.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn error_message_prefers_provider_body() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            extract_error_message(r#"{"error_description":"Invalid login credentials"}"#, status),
            "Invalid login credentials"
        );
        assert_eq!(
            extract_error_message(r#"{"msg":"Email not confirmed"}"#, status),
            "Email not confirmed"
        );
        assert_eq!(
            extract_error_message(r#"{"message":"User already registered"}"#, status),
            "User already registered"
        );
        assert_eq!(
            extract_error_message("not json", status),
            "provider returned status 400 Bad Request"
        );
        assert_eq!(
            extract_error_message(r#"{"error_description":""}"#, status),
            "provider returned status 400 Bad Request"
        );
    }

    #[tokio::test]
    async fn authorize_url_carries_pkce_challenge_and_redirect() {
        let p = provider();
        let url = p
            .sign_in_with_oauth("google", "https://app.example.com/auth/callback")
            .await
            .unwrap();
        assert!(url.starts_with("https://project.example.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback"));
        assert!(url.contains("code_challenge="));
        assert!(url.contains("code_challenge_method=s256"));

        // The verifier is held for the later exchange
        let verifier = p.pkce_verifier.read().unwrap().clone();
        assert!(verifier.is_some());
    }

    #[tokio::test]
    async fn sign_out_without_session_is_a_no_op() {
        let p = provider();
        let notified = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = std::sync::Arc::clone(&notified);
        let _subscription = p.on_auth_state_change(Box::new(move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }));

        assert!(p.sign_out().await.is_ok());
        assert!(!notified.load(std::sync::atomic::Ordering::SeqCst));
        assert!(p.current_session().is_none());
    }
}
