//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Per-user cart state synchronized with the data store
//! - `wishlist` - Per-user saved products
//! - `checkout` - Order submission: persist, format, dispatch to the relay
//! - `relay` - Chat-relay API client
//! - `messages` - Order message composition
//!
//! Services are constructed once per request from [`crate::state::AppState`]
//! and passed by reference; nothing here is ambient global state.

pub mod cart;
pub mod checkout;
pub mod messages;
pub mod relay;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod testing;

/// User-facing notification sink.
///
/// Cart, wishlist, and checkout operations surface their outcome as a
/// transient, dismissible notification; this trait is the seam through
/// which they do it. Injected so tests can observe notifications and so
/// the delivery mechanism can change without touching the services.
pub trait Notifier: Send + Sync {
    /// A successful operation, with an optional description line.
    fn success(&self, message: &str, description: Option<&str>);

    /// A failed operation, with an optional description line.
    fn error(&self, message: &str, description: Option<&str>);
}

/// Notifier that emits structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str, description: Option<&str>) {
        match description {
            Some(description) => tracing::info!(description, "{message}"),
            None => tracing::info!("{message}"),
        }
    }

    fn error(&self, message: &str, description: Option<&str>) {
        match description {
            Some(description) => tracing::warn!(description, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }
}
