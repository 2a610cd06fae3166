//! Cart route handlers.
//!
//! Every handler loads the requesting user's cart manager, applies one
//! operation, and answers with the resulting cart view. Mutation
//! failures are surfaced through notifications, not HTTP errors: the
//! response carries the (unchanged) cart state and the UI stays
//! interactive.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stg_catalog_core::{CartItemId, ProductId, format_brl};

use crate::error::Result;
use crate::gateway::types::{CartItem, Product};
use crate::middleware::RequireIdentity;
use crate::services::cart::{CartGateway, CartManager};
use crate::state::AppState;

/// Cart line item display data.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub total_display: String,
    pub item_count: u32,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let line_total = item.line_total();
        Self {
            id: item.id,
            product: item.product.clone(),
            quantity: item.quantity,
            line_total,
            line_total_display: format_brl(line_total),
        }
    }
}

/// Project a cart manager into its response shape.
fn cart_view<G: CartGateway>(cart: &CartManager<G>) -> CartView {
    let total = cart.total();
    CartView {
        items: cart.items().iter().map(CartItemView::from).collect(),
        total,
        total_display: format_brl(total),
        item_count: cart.item_count(),
    }
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Current cart contents.
#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Json<CartView> {
    let mut cart = state.cart();
    cart.sign_in(identity).await;
    Json(cart_view(&cart))
}

/// Add a product to the cart (merging into an existing line item).
#[instrument(skip(state, identity))]
pub async fn add(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state.gateway().get_product(request.product_id).await?;

    let mut cart = state.cart();
    cart.sign_in(identity).await;
    cart.add_item(&product, request.quantity.unwrap_or(1)).await;

    Ok(Json(cart_view(&cart)))
}

/// Set a line item's quantity. Quantities below 1 are a no-op.
#[instrument(skip(state, identity))]
pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<UpdateCartRequest>,
) -> Json<CartView> {
    let mut cart = state.cart();
    cart.sign_in(identity).await;
    cart.update_quantity(request.product_id, request.quantity)
        .await;
    Json(cart_view(&cart))
}

/// Remove a line item.
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<RemoveFromCartRequest>,
) -> Json<CartView> {
    let mut cart = state.cart();
    cart.sign_in(identity).await;
    cart.remove_item(request.product_id).await;
    Json(cart_view(&cart))
}

/// Remove every line item.
#[instrument(skip(state, identity))]
pub async fn clear(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Json<CartView> {
    let mut cart = state.cart();
    cart.sign_in(identity).await;
    cart.clear().await;
    Json(cart_view(&cart))
}

/// Cart count badge.
#[instrument(skip(state, identity))]
pub async fn count(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Json<CartCount> {
    let mut cart = state.cart();
    cart.sign_in(identity).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}
