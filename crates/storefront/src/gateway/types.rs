//! Domain types exchanged with the remote data store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stg_catalog_core::{CartItemId, OrderStatus, ProductId, UserId};

/// A catalog product.
///
/// Products are owned by the external catalog and are read-only from the
/// storefront's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A cart line item: one product with its quantity.
///
/// Exactly one line item exists per (user, product) pair; the cart
/// manager merges repeated adds into a quantity update instead of
/// inserting a second row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price() * Decimal::from(self.quantity)
    }

    /// Unit price of the underlying product.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.product.price
    }
}

/// An order line item to persist, unit price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

// =============================================================================
// Filters and sorting
// =============================================================================

/// Declarative product filter for catalog reads.
///
/// Absent fields impose no constraint. `category` is an exact match,
/// `search` a case-insensitive substring match on the product name, and
/// the price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Sortable product columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Price,
    Name,
}

impl SortField {
    /// Column name in the products collection.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Name => "name",
        }
    }
}

/// Sort order for catalog reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for ProductSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            ascending: true,
        }
    }
}

impl ProductSort {
    /// The `order` query parameter value, e.g. `price.desc`.
    #[must_use]
    pub fn order_param(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{direction}", self.field.column())
    }
}

// =============================================================================
// Wire rows and payloads
// =============================================================================

/// Cart row as returned by the collection API, with the product embedded
/// through its foreign key.
#[derive(Debug, Deserialize)]
pub(crate) struct CartItemRow {
    pub id: CartItemId,
    pub quantity: u32,
    pub product: Product,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product: row.product,
            quantity: row.quantity,
        }
    }
}

/// Wishlist row with the product embedded.
#[derive(Debug, Deserialize)]
pub(crate) struct WishlistRow {
    pub product: Product,
}

/// Insert payload for a cart row.
#[derive(Debug, Serialize)]
pub(crate) struct CartItemInsert {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Patch payload for a cart quantity update.
#[derive(Debug, Serialize)]
pub(crate) struct QuantityPatch {
    pub quantity: u32,
}

/// Insert payload for a wishlist row.
#[derive(Debug, Serialize)]
pub(crate) struct WishlistInsert {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// Insert payload for an order row.
#[derive(Debug, Serialize)]
pub(crate) struct OrderInsert {
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
}

/// Insert payload for an order line item row.
#[derive(Debug, Serialize)]
pub(crate) struct OrderLineItemRow {
    pub order_id: stg_catalog_core::OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Representation returned for a cart insert.
#[derive(Debug, Deserialize)]
pub(crate) struct InsertedCartItem {
    pub id: CartItemId,
}

/// Representation returned for an order insert.
#[derive(Debug, Deserialize)]
pub(crate) struct InsertedOrder {
    pub id: stg_catalog_core::OrderId,
}
