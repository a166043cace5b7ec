//! Shared test data builders

use chrono::{Duration, Utc};

use crate::models::{Identity, IdentityMetadata, ProviderSession};

/// A stable identity used across tests
#[must_use]
pub fn test_identity() -> Identity {
    Identity {
        id: "user-123".to_string(),
        email: Some("jane.doe@example.com".to_string()),
        metadata: IdentityMetadata {
            name: Some("Jane Doe".to_string()),
            avatar_url: None,
        },
    }
}

/// A provider session wrapping the given identity, valid for one hour
#[must_use]
pub fn test_session(identity: Identity) -> ProviderSession {
    ProviderSession {
        access_token: "test-access-token".to_string(),
        refresh_token: Some("test-refresh-token".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
        identity,
    }
}
