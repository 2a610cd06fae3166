//! Request extractors and middleware.

pub mod identity;

pub use identity::{OptionalIdentity, RequireIdentity};
