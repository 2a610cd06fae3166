//! Wishlist route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use stg_catalog_core::ProductId;

use crate::error::Result;
use crate::gateway::types::Product;
use crate::middleware::RequireIdentity;
use crate::state::AppState;

/// Wishlist membership request.
#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Current wishlist contents.
#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Json<Vec<Product>> {
    let mut wishlist = state.wishlist();
    wishlist.sign_in(identity).await;
    Json(wishlist.items().to_vec())
}

/// Save a product. Saving an already-saved product is a no-op.
#[instrument(skip(state, identity))]
pub async fn add(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<WishlistRequest>,
) -> Result<Json<Vec<Product>>> {
    let product = state.gateway().get_product(request.product_id).await?;

    let mut wishlist = state.wishlist();
    wishlist.sign_in(identity).await;
    if !wishlist.is_in_wishlist(product.id) {
        wishlist.add_item(&product).await;
    }

    Ok(Json(wishlist.items().to_vec()))
}

/// Remove a saved product. Removing an absent product is a safe no-op.
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<WishlistRequest>,
) -> Json<Vec<Product>> {
    let mut wishlist = state.wishlist();
    wishlist.sign_in(identity).await;
    wishlist.remove_item(request.product_id).await;
    Json(wishlist.items().to_vec())
}
