//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /api/products            - Product listing (filters + sort)
//! GET  /api/products/{id}       - Product detail
//! GET  /api/search/history      - Recent search terms
//!
//! # Cart
//! GET  /api/cart                - Cart contents
//! POST /api/cart/add            - Add product (merges duplicates)
//! POST /api/cart/update         - Set line item quantity
//! POST /api/cart/remove         - Remove line item
//! POST /api/cart/clear          - Remove every line item
//! GET  /api/cart/count          - Cart count badge
//!
//! # Wishlist
//! GET  /api/wishlist            - Wishlist contents
//! POST /api/wishlist/add        - Save product
//! POST /api/wishlist/remove     - Remove saved product
//!
//! # Orders
//! POST /api/checkout            - Submit the cart as an order
//! POST /api/send-order          - Relay trigger (no auth)
//!
//! # Preferences
//! GET  /api/preferences         - User preferences object
//! PUT  /api/preferences         - Store user preferences
//! GET  /api/preferences/theme   - Theme preference
//! PUT  /api/preferences/theme   - Store theme preference
//! ```
//!
//! Identity comes from the `x-user-*` headers installed by the external
//! identity layer; see [`crate::middleware::identity`].

pub mod cart;
pub mod orders;
pub mod preferences;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
}

/// Create the preference routes router.
pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(preferences::show_preferences).put(preferences::set_preferences),
        )
        .route(
            "/theme",
            get(preferences::show_theme).put(preferences::set_theme),
        )
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .route("/api/search/history", get(products::search_history))
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .route("/api/checkout", post(orders::checkout))
        .route("/api/send-order", post(orders::send_order))
        .nest("/api/preferences", preference_routes())
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
