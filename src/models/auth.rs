//! Common authentication data types
//!
//! Unified data structures used by the gateway, the session store and the
//! HTTP handlers. The identity record is owned by the external provider;
//! everything here is a read-only projection of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only projection of the provider-owned user record.
///
/// Created by the provider on registration, refreshed on every session-state
/// push and cleared on logout. The application never mutates it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned unique identifier
    pub id: String,
    pub email: Option<String>,
    /// Optional display metadata attached at registration or profile update
    #[serde(rename = "user_metadata", default)]
    pub metadata: IdentityMetadata,
}

/// Display metadata carried inside the identity record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Display name, falling back to the email address
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.metadata.name.as_deref().or(self.email.as_deref())
    }
}

/// Email and password pair for login. Transient; never retained after the
/// call resolves.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration data. The `name` is attached as identity metadata at
/// creation time. Password length and confirmation checks are caller
/// responsibility and happen before this ever reaches the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Fields accepted by a profile update; merged into identity metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Uniform outcome of every gateway operation.
///
/// Exactly one of `identity` or `error` is meaningful per call; both absent
/// denotes a void success (logout, password-reset request).
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub identity: Option<Identity>,
    pub error: Option<String>,
}

impl AuthResult {
    /// Successful operation that yielded an identity
    #[must_use]
    pub fn ok(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            error: None,
        }
    }

    /// Failed operation with a user-facing message
    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            identity: None,
            error: Some(message.into()),
        }
    }

    /// Void success (no identity to report)
    #[must_use]
    pub fn void() -> Self {
        Self {
            identity: None,
            error: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Provider-issued session material.
///
/// The HTTP boundary mirrors this into `HttpOnly` cookies; the in-process
/// provider client keeps it as the current session for subsequent calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub identity: Identity,
}
