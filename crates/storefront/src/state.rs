//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::LocalCaches;
use crate::config::StorefrontConfig;
use crate::gateway::{DataGateway, GatewayError};
use crate::services::cart::CartManager;
use crate::services::relay::RelayClient;
use crate::services::wishlist::WishlistManager;
use crate::services::{Notifier, TracingNotifier};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration, the data store client, the relay
/// client, and the local caches. Per-request service objects (cart and
/// wishlist managers) are constructed from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: DataGateway,
    relay: RelayClient,
    caches: LocalCaches,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data store client cannot be built from
    /// the configured credentials.
    pub fn new(config: StorefrontConfig) -> Result<Self, GatewayError> {
        let gateway = DataGateway::new(&config.data_store)?;
        let relay = RelayClient::new(&config.relay);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                relay,
                caches: LocalCaches::new(),
                notifier: Arc::new(TracingNotifier),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the data store client.
    #[must_use]
    pub fn gateway(&self) -> &DataGateway {
        &self.inner.gateway
    }

    /// Get a reference to the chat-relay client.
    #[must_use]
    pub fn relay(&self) -> &RelayClient {
        &self.inner.relay
    }

    /// Get a reference to the local caches.
    #[must_use]
    pub fn caches(&self) -> &LocalCaches {
        &self.inner.caches
    }

    /// Get the notification sink.
    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    /// Build a cart manager bound to this state's gateway and caches.
    #[must_use]
    pub fn cart(&self) -> CartManager<DataGateway> {
        CartManager::new(
            self.inner.gateway.clone(),
            self.inner.caches.cart_snapshots().clone(),
            self.notifier(),
        )
    }

    /// Build a wishlist manager bound to this state's gateway.
    #[must_use]
    pub fn wishlist(&self) -> WishlistManager<DataGateway> {
        WishlistManager::new(self.inner.gateway.clone(), self.notifier())
    }
}
