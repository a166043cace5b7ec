//! Testing utilities: mock provider and fixtures
//!
//! Available to unit tests and, behind the `testing` feature, to
//! integration tests.

pub mod fixtures;
pub mod mock;

pub use fixtures::{test_identity, test_session};
pub use mock::MockProvider;
