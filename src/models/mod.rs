//! Data model types shared across the application

pub mod auth;

// Re-export commonly used items for convenience
pub use auth::{
    AuthResult, Identity, IdentityMetadata, LoginCredentials, ProfileUpdate, ProviderSession,
    RegisterData,
};
