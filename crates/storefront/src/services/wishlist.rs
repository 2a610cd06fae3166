//! Per-user wishlist state, synchronized with the data store.
//!
//! Simpler analogue of the cart manager: membership only, no
//! quantities, no local cache layer. Same lifecycle - load on sign-in,
//! drop on sign-out - and the same remote-before-memory ordering on
//! every mutation.

use std::sync::Arc;

use stg_catalog_core::{ProductId, UserId};

use crate::gateway::GatewayError;
use crate::gateway::types::Product;
use crate::models::Identity;
use crate::services::Notifier;

/// Data store operations the wishlist manager depends on.
pub trait WishlistGateway: Send + Sync {
    async fn read_wishlist(&self, user_id: UserId) -> Result<Vec<Product>, GatewayError>;

    async fn add_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError>;

    async fn delete_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError>;
}

/// Saved products for one signed-in user.
pub struct WishlistManager<G> {
    gateway: G,
    notifier: Arc<dyn Notifier>,
    identity: Option<Identity>,
    items: Vec<Product>,
}

impl<G: WishlistGateway> WishlistManager<G> {
    #[must_use]
    pub fn new(gateway: G, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            identity: None,
            items: Vec::new(),
        }
    }

    /// Load the wishlist for a signed-in identity.
    pub async fn sign_in(&mut self, identity: Identity) {
        let user_id = identity.id;
        self.identity = Some(identity);

        match self.gateway.read_wishlist(user_id).await {
            Ok(items) => self.items = items,
            Err(e) => {
                tracing::error!(error = %e, "failed to load wishlist");
                self.notifier
                    .error("Erro ao carregar lista de desejos", None);
                self.items.clear();
            }
        }
    }

    /// Drop all in-memory state.
    pub fn sign_out(&mut self) {
        self.identity = None;
        self.items.clear();
    }

    /// Save a product.
    pub async fn add_item(&mut self, product: &Product) {
        let Some(user_id) = self.user_id() else {
            return;
        };

        match self.gateway.add_wishlist_entry(user_id, product.id).await {
            Ok(()) => {
                self.items.push(product.clone());
                self.notifier.success(
                    "Adicionado à lista de desejos",
                    Some(&format!(
                        "{} foi adicionado à sua lista de desejos",
                        product.name
                    )),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add product to wishlist");
                self.notifier
                    .error("Erro ao adicionar à lista de desejos", None);
            }
        }
    }

    /// Remove a saved product. Removing a product that is not saved is a
    /// safe no-op: the remote delete matches zero rows and nothing
    /// changes in memory.
    pub async fn remove_item(&mut self, product_id: ProductId) {
        let Some(user_id) = self.user_id() else {
            return;
        };

        match self.gateway.delete_wishlist_entry(user_id, product_id).await {
            Ok(()) => {
                let removed = self
                    .items
                    .iter()
                    .position(|item| item.id == product_id)
                    .map(|index| self.items.remove(index));

                let description = removed
                    .map(|product| format!("{} foi removido da sua lista de desejos", product.name));
                self.notifier
                    .success("Removido da lista de desejos", description.as_deref());
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to remove product from wishlist");
                self.notifier
                    .error("Erro ao remover da lista de desejos", None);
            }
        }
    }

    /// Membership check against the in-memory list.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|identity| identity.id)
    }
}
