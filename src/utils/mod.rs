//! Shared utilities

pub mod responses;
