//! Session state management
//!
//! - [`store`] - single-writer session store with watch-based readers
//! - [`context`] - the auth-state subscriber that owns the store
//! - [`cookie`] - session cookie issuance for the HTTP boundary

pub mod context;
pub mod cookie;
pub mod store;

// Re-export commonly used items for convenience
pub use context::SessionContext;
pub use cookie::{expired_cookies, session_cookies, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use store::{Session, SessionReader, SessionStore};
