//! Shared request-scoped models.

pub mod identity;

pub use identity::Identity;
