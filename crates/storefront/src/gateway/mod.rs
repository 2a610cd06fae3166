//! Remote data store client.
//!
//! All persistence is delegated to an external backend-as-a-service data
//! store exposing its collections (`products`, `cart_items`, `wishlist`,
//! `orders`, `order_items`) over a REST query API. This module wraps that
//! API in a typed client; callers never see raw requests.
//!
//! Product reads are cached with `moka` (5-minute TTL). Cart, wishlist
//! and order operations hit the store directly - mutable state is never
//! cached here.
//!
//! No operation retries implicitly; every failure surfaces as a single
//! [`GatewayError`] and the caller decides what to do with it.

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use rust_decimal::Decimal;
use stg_catalog_core::{CartItemId, OrderId, ProductId, UserId};

use crate::config::DataStoreConfig;
use crate::services::cart::CartGateway;
use crate::services::checkout::OrderGateway;
use crate::services::wishlist::WishlistGateway;

use cache::CacheValue;
use types::{
    CartItem, CartItemInsert, CartItemRow, InsertedCartItem, InsertedOrder, OrderInsert,
    OrderLineItemInput, OrderLineItemRow, Product, ProductFilter, ProductSort, QuantityPatch,
    WishlistInsert, WishlistRow,
};

/// Errors that can occur when talking to the data store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

// =============================================================================
// DataGateway
// =============================================================================

/// Client for the remote data store's collection API.
///
/// Provides typed access to products, cart items, wishlist entries, and
/// orders. Product reads are cached for 5 minutes.
#[derive(Clone)]
pub struct DataGateway {
    inner: Arc<DataGatewayInner>,
}

struct DataGatewayInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for DataGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGateway")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl DataGateway {
    /// Create a new data store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build from the
    /// configured service key.
    pub fn new(config: &DataStoreConfig) -> Result<Self, GatewayError> {
        let key = config.service_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| GatewayError::Parse(format!("Invalid service key format: {e}")))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Parse(format!("Invalid service key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let endpoint = format!("{}/rest/v1", config.url.trim_end_matches('/'));

        Ok(Self {
            inner: Arc::new(DataGatewayInner {
                client,
                endpoint,
                cache,
            }),
        })
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.inner.endpoint)
    }

    /// Turn a response into a decoded body, mapping non-success statuses
    /// and parse failures to structured errors.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "data store returned non-success status"
            );
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse data store response"
            );
            GatewayError::Parse(e.to_string())
        })
    }

    /// Check a response status, discarding any body.
    async fn expect_success(response: reqwest::Response) -> Result<(), GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            body = %message.chars().take(500).collect::<String>(),
            "data store returned non-success status"
        );
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .inner
            .client
            .get(self.url(collection))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Insert returning the created representation.
    async fn insert_returning<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .inner
            .client
            .post(self.url(collection))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn insert<B: Serialize>(&self, collection: &str, body: &B) -> Result<(), GatewayError> {
        let response = self
            .inner
            .client
            .post(self.url(collection))
            .json(body)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn patch<B: Serialize>(
        &self,
        collection: &str,
        query: &[(String, String)],
        body: &B,
    ) -> Result<(), GatewayError> {
        let response = self
            .inner
            .client
            .patch(self.url(collection))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn delete(
        &self,
        collection: &str,
        query: &[(String, String)],
    ) -> Result<(), GatewayError> {
        let response = self
            .inner
            .client
            .delete(self.url(collection))
            .query(query)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching a filter, in the given order.
    ///
    /// Listings without a search term are cached for 5 minutes; search
    /// results always hit the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: &ProductSort,
    ) -> Result<Vec<Product>, GatewayError> {
        let cache_key = format!(
            "products:{:?}:{:?}:{:?}:{}",
            filter.category,
            filter.min_price,
            filter.max_price,
            sort.order_param()
        );

        // Check cache (only for queries without free-text search)
        if filter.search.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        if let Some(category) = &filter.category {
            query.push(("category".to_string(), format!("eq.{category}")));
        }
        if let Some(search) = &filter.search {
            query.push(("name".to_string(), format!("ilike.*{search}*")));
        }
        if let Some(min) = filter.min_price {
            query.push(("price".to_string(), format!("gte.{min}")));
        }
        if let Some(max) = filter.max_price {
            query.push(("price".to_string(), format!("lte.{max}")));
        }
        query.push(("order".to_string(), sort.order_param()));

        let products: Vec<Product> = self.get_rows("products", &query).await?;

        // Cache if not a search query
        if filter.search.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a single product by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, GatewayError> {
        let cache_key = format!("product:{product_id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let query = vec![
            ("select".to_string(), "*".to_string()),
            ("id".to_string(), format!("eq.{product_id}")),
        ];
        let rows: Vec<Product> = self.get_rows("products", &query).await?;
        let product = rows
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(format!("Product not found: {product_id}")))?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Read a user's cart, products embedded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn read_cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, GatewayError> {
        let query = vec![
            (
                "select".to_string(),
                "id,quantity,product:products(*)".to_string(),
            ),
            ("user_id".to_string(), format!("eq.{user_id}")),
        ];
        let rows: Vec<CartItemRow> = self.get_rows("cart_items", &query).await?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Insert a cart row, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn insert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemId, GatewayError> {
        let rows: Vec<InsertedCartItem> = self
            .insert_returning(
                "cart_items",
                &CartItemInsert {
                    user_id,
                    product_id,
                    quantity,
                },
            )
            .await?;
        rows.into_iter().next().map(|row| row.id).ok_or_else(|| {
            GatewayError::Parse("empty representation for cart item insert".to_string())
        })
    }

    /// Update the quantity of one cart row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn patch_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let query = vec![
            ("user_id".to_string(), format!("eq.{user_id}")),
            ("product_id".to_string(), format!("eq.{product_id}")),
        ];
        self.patch("cart_items", &query, &QuantityPatch { quantity })
            .await
    }

    /// Delete one cart row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn delete_cart_row(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        let query = vec![
            ("user_id".to_string(), format!("eq.{user_id}")),
            ("product_id".to_string(), format!("eq.{product_id}")),
        ];
        self.delete("cart_items", &query).await
    }

    /// Delete every cart row for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_cart_rows(&self, user_id: UserId) -> Result<(), GatewayError> {
        let query = vec![("user_id".to_string(), format!("eq.{user_id}"))];
        self.delete("cart_items", &query).await
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Read a user's wishlist, products embedded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn read_wishlist_products(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Product>, GatewayError> {
        let query = vec![
            ("select".to_string(), "product:products(*)".to_string()),
            ("user_id".to_string(), format!("eq.{user_id}")),
        ];
        let rows: Vec<WishlistRow> = self.get_rows("wishlist", &query).await?;
        Ok(rows.into_iter().map(|row| row.product).collect())
    }

    /// Insert a wishlist row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn insert_wishlist_row(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.insert(
            "wishlist",
            &WishlistInsert {
                user_id,
                product_id,
            },
        )
        .await
    }

    /// Delete a wishlist row. Deleting a row that does not exist matches
    /// zero rows and is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn delete_wishlist_row(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        let query = vec![
            ("user_id".to_string(), format!("eq.{user_id}")),
            ("product_id".to_string(), format!("eq.{product_id}")),
        ];
        self.delete("wishlist", &query).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Insert an order row, returning the new order's ID.
    ///
    /// Orders are created with status `pending_notification`; the status
    /// flips only once a reconciliation pass confirms delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn insert_order(
        &self,
        user_id: UserId,
        total: Decimal,
    ) -> Result<OrderId, GatewayError> {
        let rows: Vec<InsertedOrder> = self
            .insert_returning(
                "orders",
                &OrderInsert {
                    user_id,
                    total,
                    status: stg_catalog_core::OrderStatus::PendingNotification,
                },
            )
            .await?;
        rows.into_iter().next().map(|row| row.id).ok_or_else(|| {
            GatewayError::Parse("empty representation for order insert".to_string())
        })
    }

    /// Bulk-insert the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self, items), fields(order_id = %order_id, count = items.len()))]
    pub async fn insert_order_line_items(
        &self,
        order_id: OrderId,
        items: &[OrderLineItemInput],
    ) -> Result<(), GatewayError> {
        let rows: Vec<OrderLineItemRow> = items
            .iter()
            .map(|item| OrderLineItemRow {
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();
        self.insert("order_items", &rows).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached product data.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

// =============================================================================
// Service trait implementations
// =============================================================================

impl CartGateway for DataGateway {
    async fn read_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, GatewayError> {
        self.read_cart_items(user_id).await
    }

    async fn write_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemId, GatewayError> {
        self.insert_cart_item(user_id, product_id, quantity).await
    }

    async fn update_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.patch_cart_item_quantity(user_id, product_id, quantity)
            .await
    }

    async fn delete_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.delete_cart_row(user_id, product_id).await
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), GatewayError> {
        self.delete_cart_rows(user_id).await
    }
}

impl WishlistGateway for DataGateway {
    async fn read_wishlist(&self, user_id: UserId) -> Result<Vec<Product>, GatewayError> {
        self.read_wishlist_products(user_id).await
    }

    async fn add_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.insert_wishlist_row(user_id, product_id).await
    }

    async fn delete_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.delete_wishlist_row(user_id, product_id).await
    }
}

impl OrderGateway for DataGateway {
    async fn create_order(&self, user_id: UserId, total: Decimal) -> Result<OrderId, GatewayError> {
        self.insert_order(user_id, total).await
    }

    async fn create_order_line_items(
        &self,
        order_id: OrderId,
        items: &[OrderLineItemInput],
    ) -> Result<(), GatewayError> {
        self.insert_order_line_items(order_id, items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = GatewayError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - unavailable");
    }
}
