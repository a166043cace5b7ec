#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the authrelay application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod gateway;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use gateway::AuthGateway;
pub use guard::{session_guard, RoutePolicy};
pub use models::{AuthResult, Identity};
pub use provider::{GoTrueProvider, IdentityProvider};
pub use session::SessionContext;
pub use settings::AuthrelaySettings;
