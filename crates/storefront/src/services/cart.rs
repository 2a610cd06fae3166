//! Per-user cart state, synchronized with the data store.
//!
//! The manager owns the in-memory line items for one signed-in user and
//! keeps them consistent with the remote `cart_items` collection. Every
//! mutation writes the store first and touches memory only after the
//! write succeeds; on failure memory is left untouched and the outcome is
//! surfaced as a notification. Derived values (total, item count) are
//! recomputed on every read, never cached.
//!
//! A per-user snapshot in the local cache lets a fresh sign-in skip the
//! remote read when the snapshot is younger than the freshness window.

use std::sync::Arc;

use rust_decimal::Decimal;

use stg_catalog_core::{CartItemId, ProductId, UserId};

use crate::cache::CartSnapshotCache;
use crate::gateway::GatewayError;
use crate::gateway::types::{CartItem, Product};
use crate::models::Identity;
use crate::services::Notifier;

/// Data store operations the cart manager depends on.
pub trait CartGateway: Send + Sync {
    async fn read_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, GatewayError>;

    async fn write_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemId, GatewayError>;

    async fn update_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError>;

    async fn delete_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError>;

    async fn clear_cart(&self, user_id: UserId) -> Result<(), GatewayError>;
}

/// Cart lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartState {
    /// No signed-in identity.
    #[default]
    Empty,
    /// Identity present, initial load in flight.
    Loading,
    /// Items loaded (possibly zero).
    Ready,
}

/// Cart line items for one signed-in user.
pub struct CartManager<G> {
    gateway: G,
    snapshots: CartSnapshotCache,
    notifier: Arc<dyn Notifier>,
    identity: Option<Identity>,
    items: Vec<CartItem>,
    state: CartState,
}

impl<G: CartGateway> CartManager<G> {
    #[must_use]
    pub fn new(gateway: G, snapshots: CartSnapshotCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            snapshots,
            notifier,
            identity: None,
            items: Vec::new(),
            state: CartState::Empty,
        }
    }

    /// Load the cart for a signed-in identity.
    ///
    /// A snapshot younger than the freshness window stands in for the
    /// remote read. A failed remote read leaves the cart ready with no
    /// items; the failure is surfaced as a notification and not retried.
    pub async fn sign_in(&mut self, identity: Identity) {
        let user_id = identity.id;
        self.identity = Some(identity);
        self.state = CartState::Loading;

        if let Some(snapshot) = self.snapshots.get(user_id)
            && snapshot.is_fresh()
        {
            self.items = snapshot.items;
            self.state = CartState::Ready;
            return;
        }

        match self.gateway.read_cart(user_id).await {
            Ok(items) => {
                self.items = items;
                self.snapshots.set(user_id, &self.items);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load cart");
                self.notifier.error("Erro ao carregar carrinho", None);
                self.items.clear();
            }
        }
        self.state = CartState::Ready;
    }

    /// Drop all in-memory state and the cached snapshot.
    pub fn sign_out(&mut self) {
        if let Some(identity) = self.identity.take() {
            self.snapshots.remove(identity.id);
        }
        self.items.clear();
        self.state = CartState::Empty;
    }

    /// Add a product to the cart.
    ///
    /// If a line item for the product already exists, its quantity is
    /// increased instead - a duplicate line item is never created.
    pub async fn add_item(&mut self, product: &Product, quantity: u32) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        if quantity < 1 {
            return;
        }

        let existing = self
            .items
            .iter()
            .find(|item| item.product.id == product.id)
            .map(|item| item.quantity);

        let result = match existing {
            Some(current) => {
                self.write_quantity(user_id, product.id, current + quantity)
                    .await
            }
            None => match self
                .gateway
                .write_cart_item(user_id, product.id, quantity)
                .await
            {
                Ok(id) => {
                    self.items.push(CartItem {
                        id,
                        product: product.clone(),
                        quantity,
                    });
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(()) => {
                self.store_snapshot();
                self.notifier.success(
                    "Produto adicionado ao carrinho",
                    Some(&format!("{} foi adicionado com sucesso", product.name)),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add product to cart");
                self.notifier.error(
                    "Erro ao adicionar produto",
                    Some("Tente novamente em alguns instantes"),
                );
            }
        }
    }

    /// Set the quantity of an existing line item.
    ///
    /// Quantities below 1 are a complete no-op - removing an item goes
    /// through [`Self::remove_item`] explicitly, never through a
    /// decrement to zero.
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        if quantity < 1 {
            return;
        }

        match self.write_quantity(user_id, product_id, quantity).await {
            Ok(()) => self.store_snapshot(),
            Err(e) => {
                tracing::error!(error = %e, "failed to update cart quantity");
                self.notifier.error("Erro ao atualizar quantidade", None);
            }
        }
    }

    /// Remove a line item.
    pub async fn remove_item(&mut self, product_id: ProductId) {
        let Some(user_id) = self.user_id() else {
            return;
        };

        match self.gateway.delete_cart_item(user_id, product_id).await {
            Ok(()) => {
                let removed = self
                    .items
                    .iter()
                    .position(|item| item.product.id == product_id)
                    .map(|index| self.items.remove(index));
                self.store_snapshot();

                let description =
                    removed.map(|item| format!("{} foi removido do carrinho", item.product.name));
                self.notifier
                    .success("Produto removido", description.as_deref());
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to remove product from cart");
                self.notifier.error("Erro ao remover produto", None);
            }
        }
    }

    /// Remove every line item and the cached snapshot.
    pub async fn clear(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };

        match self.gateway.clear_cart(user_id).await {
            Ok(()) => {
                self.items.clear();
                self.snapshots.remove(user_id);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to clear cart");
                self.notifier.error("Erro ao limpar carrinho", None);
            }
        }
    }

    /// Sum of line subtotals. Recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of line quantities. Recomputed on every call.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        self.state
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|identity| identity.id)
    }

    /// Write a quantity remotely, then mirror it in memory.
    async fn write_quantity(
        &mut self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.gateway
            .update_cart_item_quantity(user_id, product_id, quantity)
            .await?;
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        {
            item.quantity = quantity;
        }
        Ok(())
    }

    fn store_snapshot(&self) {
        if let Some(user_id) = self.user_id() {
            self.snapshots.set(user_id, &self.items);
        }
    }
}
