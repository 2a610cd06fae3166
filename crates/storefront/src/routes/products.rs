//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use stg_catalog_core::ProductId;

use crate::catalog::{FilterSelections, build_product_query};
use crate::error::Result;
use crate::gateway::types::Product;
use crate::middleware::{OptionalIdentity, RequireIdentity};
use crate::state::AppState;

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    /// Whether the product is in the requesting user's wishlist; false
    /// for anonymous requests.
    pub in_wishlist: bool,
}

/// List products matching the query-string filter selections.
///
/// Non-empty search terms are recorded in the search history.
#[instrument(skip(state, _identity))]
pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(_identity): RequireIdentity,
    Query(selections): Query<FilterSelections>,
) -> Result<Json<Vec<Product>>> {
    let (filter, sort) = build_product_query(&selections);

    if let Some(term) = &filter.search {
        state.caches().search_history().record(term);
    }

    let products = state.gateway().list_products(&filter, &sort).await?;
    Ok(Json(products))
}

/// Product detail, with the wishlist flag when an identity is present.
#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state.gateway().get_product(product_id).await?;

    let in_wishlist = match identity {
        Some(identity) => {
            let mut wishlist = state.wishlist();
            wishlist.sign_in(identity).await;
            wishlist.is_in_wishlist(product.id)
        }
        None => false,
    };

    Ok(Json(ProductDetail {
        product,
        in_wishlist,
    }))
}

/// Recent search terms, most recent first.
#[instrument(skip(state))]
pub async fn search_history(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.caches().search_history().recent())
}
