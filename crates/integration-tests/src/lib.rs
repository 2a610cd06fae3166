//! Test harness for black-box storefront API tests.
//!
//! Builds the real router against two in-process mock upstreams: a
//! minimal collection API standing in for the data store and a recording
//! chat-relay endpoint. Tests drive the router with `tower::ServiceExt`
//! and assert on HTTP responses plus the state the mocks accumulated.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use stg_catalog_core::ProductId;
use stg_catalog_storefront::config::{DataStoreConfig, RelayConfig, StorefrontConfig};
use stg_catalog_storefront::gateway::types::Product;
use stg_catalog_storefront::routes;
use stg_catalog_storefront::state::AppState;

// =============================================================================
// Test fixtures
// =============================================================================

/// A signed-in test user, forwarded as identity headers.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Fresh test user.
#[must_use]
pub fn test_user() -> TestUser {
    TestUser {
        id: Uuid::new_v4(),
        name: "Maria".to_string(),
        email: "maria@test.com".to_string(),
    }
}

/// Build a product with a binary-exact price (so float serialization
/// round-trips exactly) and a timestamp offset for deterministic
/// creation-time ordering.
#[must_use]
pub fn sample_product(name: &str, price: &str, category: &str, created_offset_min: i64) -> Product {
    Product {
        id: ProductId::new(Uuid::new_v4()),
        name: name.to_string(),
        description: format!("{name} de teste"),
        price: price.parse::<Decimal>().expect("valid price"),
        image_url: format!("https://cdn.test/{name}.png"),
        category: category.to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
            + chrono::TimeDelta::minutes(created_offset_min),
    }
}

// =============================================================================
// Mock data store
// =============================================================================

#[derive(Debug, Clone)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    quantity: u32,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: f64,
    pub status: String,
}

#[derive(Default)]
struct StoreInner {
    products: Vec<Product>,
    cart_rows: Vec<CartRow>,
    wishlist_rows: Vec<(Uuid, Uuid)>,
    orders: Vec<OrderRow>,
    order_items: Vec<Value>,
}

type StoreState = Arc<Mutex<StoreInner>>;

/// In-process stand-in for the data store's collection API.
#[derive(Clone)]
pub struct MockDataStore {
    addr: SocketAddr,
    state: StoreState,
}

impl MockDataStore {
    /// Bind the mock on an ephemeral port and serve it in the
    /// background.
    pub async fn spawn() -> Self {
        let state: StoreState = Arc::default();

        let router = Router::new()
            .route("/rest/v1/products", get(store_list_products))
            .route(
                "/rest/v1/cart_items",
                get(store_read_cart)
                    .post(store_insert_cart)
                    .patch(store_patch_cart)
                    .delete(store_delete_cart),
            )
            .route(
                "/rest/v1/wishlist",
                get(store_read_wishlist)
                    .post(store_insert_wishlist)
                    .delete(store_delete_wishlist),
            )
            .route("/rest/v1/orders", post(store_insert_order))
            .route("/rest/v1/order_items", post(store_insert_order_items))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock store");
        let addr = listener.local_addr().expect("mock store addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock store");
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seed_product(&self, product: &Product) {
        self.state
            .lock()
            .unwrap()
            .products
            .push(product.clone());
    }

    #[must_use]
    pub fn cart_row_count(&self, user_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .cart_rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .count()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<OrderRow> {
        self.state.lock().unwrap().orders.clone()
    }

    #[must_use]
    pub fn order_item_count(&self) -> usize {
        self.state.lock().unwrap().order_items.len()
    }
}

/// Extract the payload of a `<op>.<value>` filter parameter.
fn filter_value<'a>(params: &'a [(String, String)], key: &str, op: &str) -> Option<&'a str> {
    params
        .iter()
        .find_map(|(k, v)| (k == key).then_some(v.as_str()))
        .and_then(|v| v.strip_prefix(op))
}

/// Extract every `<op>.<value>` payload for a repeated key.
fn filter_values<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

async fn store_list_products(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<Product>> {
    let inner = state.lock().unwrap();
    let mut products: Vec<Product> = inner.products.clone();
    drop(inner);

    if let Some(category) = filter_value(&params, "category", "eq.") {
        products.retain(|p| p.category == category);
    }
    if let Some(pattern) = filter_value(&params, "name", "ilike.") {
        let needle = pattern.trim_matches('*').to_lowercase();
        products.retain(|p| p.name.to_lowercase().contains(&needle));
    }
    for bound in filter_values(&params, "price") {
        if let Some(min) = bound.strip_prefix("gte.") {
            let min: Decimal = min.parse().unwrap();
            products.retain(|p| p.price >= min);
        } else if let Some(max) = bound.strip_prefix("lte.") {
            let max: Decimal = max.parse().unwrap();
            products.retain(|p| p.price <= max);
        }
    }
    if let Some(id) = filter_value(&params, "id", "eq.") {
        let id: Uuid = id.parse().unwrap();
        products.retain(|p| p.id.as_uuid() == id);
    }

    if let Some(order) = params
        .iter()
        .find_map(|(k, v)| (k == "order").then_some(v.as_str()))
    {
        let (field, direction) = order.split_once('.').unwrap_or((order, "asc"));
        match field {
            "price" => products.sort_by(|a, b| a.price.cmp(&b.price)),
            "name" => products.sort_by(|a, b| a.name.cmp(&b.name)),
            _ => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        if direction == "desc" {
            products.reverse();
        }
    }

    Json(products)
}

async fn store_read_cart(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    let user_id: Uuid = filter_value(&params, "user_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();

    let inner = state.lock().unwrap();
    let rows: Vec<Value> = inner
        .cart_rows
        .iter()
        .filter(|row| row.user_id == user_id)
        .filter_map(|row| {
            let product = inner
                .products
                .iter()
                .find(|p| p.id.as_uuid() == row.product_id)?;
            Some(json!({
                "id": row.id,
                "quantity": row.quantity,
                "product": product,
            }))
        })
        .collect();

    Json(Value::Array(rows))
}

async fn store_insert_cart(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> Response {
    let row = CartRow {
        id: Uuid::new_v4(),
        user_id: body["user_id"].as_str().unwrap().parse().unwrap(),
        product_id: body["product_id"].as_str().unwrap().parse().unwrap(),
        quantity: u32::try_from(body["quantity"].as_u64().unwrap()).unwrap(),
    };
    let id = row.id;
    state.lock().unwrap().cart_rows.push(row);

    (StatusCode::CREATED, Json(json!([{ "id": id }]))).into_response()
}

async fn store_patch_cart(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> StatusCode {
    let user_id: Uuid = filter_value(&params, "user_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();
    let product_id: Uuid = filter_value(&params, "product_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap()).unwrap();

    for row in &mut state.lock().unwrap().cart_rows {
        if row.user_id == user_id && row.product_id == product_id {
            row.quantity = quantity;
        }
    }
    StatusCode::NO_CONTENT
}

async fn store_delete_cart(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
) -> StatusCode {
    let user_id: Uuid = filter_value(&params, "user_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();
    let product_id: Option<Uuid> =
        filter_value(&params, "product_id", "eq.").map(|id| id.parse().unwrap());

    state.lock().unwrap().cart_rows.retain(|row| {
        row.user_id != user_id
            || product_id.is_some_and(|product_id| row.product_id != product_id)
    });
    StatusCode::NO_CONTENT
}

async fn store_read_wishlist(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    let user_id: Uuid = filter_value(&params, "user_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();

    let inner = state.lock().unwrap();
    let rows: Vec<Value> = inner
        .wishlist_rows
        .iter()
        .filter(|(owner, _)| *owner == user_id)
        .filter_map(|(_, product_id)| {
            let product = inner.products.iter().find(|p| p.id.as_uuid() == *product_id)?;
            Some(json!({ "product": product }))
        })
        .collect();

    Json(Value::Array(rows))
}

async fn store_insert_wishlist(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> StatusCode {
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();
    let product_id: Uuid = body["product_id"].as_str().unwrap().parse().unwrap();
    state
        .lock()
        .unwrap()
        .wishlist_rows
        .push((user_id, product_id));
    StatusCode::CREATED
}

async fn store_delete_wishlist(
    State(state): State<StoreState>,
    Query(params): Query<Vec<(String, String)>>,
) -> StatusCode {
    let user_id: Uuid = filter_value(&params, "user_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();
    let product_id: Uuid = filter_value(&params, "product_id", "eq.")
        .unwrap()
        .parse()
        .unwrap();

    state
        .lock()
        .unwrap()
        .wishlist_rows
        .retain(|row| *row != (user_id, product_id));
    StatusCode::NO_CONTENT
}

async fn store_insert_order(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> Response {
    let row = OrderRow {
        id: Uuid::new_v4(),
        user_id: body["user_id"].as_str().unwrap().parse().unwrap(),
        total: body["total"].as_f64().unwrap(),
        status: body["status"].as_str().unwrap().to_string(),
    };
    let id = row.id;
    state.lock().unwrap().orders.push(row);

    (StatusCode::CREATED, Json(json!([{ "id": id }]))).into_response()
}

async fn store_insert_order_items(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> StatusCode {
    if let Value::Array(items) = body {
        state.lock().unwrap().order_items.extend(items);
    }
    StatusCode::CREATED
}

// =============================================================================
// Mock relay
// =============================================================================

#[derive(Default)]
struct RelayInner {
    messages: Mutex<Vec<Value>>,
    auth_headers: Mutex<Vec<String>>,
    fail: AtomicBool,
}

/// In-process stand-in for the chat-relay API.
#[derive(Clone)]
pub struct MockRelay {
    addr: SocketAddr,
    state: Arc<RelayInner>,
}

impl MockRelay {
    /// Bind the mock on an ephemeral port and serve it in the
    /// background.
    pub async fn spawn() -> Self {
        let state: Arc<RelayInner> = Arc::default();

        let router = Router::new()
            .route("/message/send-text", post(relay_send_text))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock relay");
        let addr = listener.local_addr().expect("mock relay addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock relay");
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Reject the next calls with a 401 until reset.
    pub fn set_fail(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::SeqCst);
    }

    /// Delivered `{phone, message}` payloads.
    #[must_use]
    pub fn messages(&self) -> Vec<Value> {
        self.state.messages.lock().unwrap().clone()
    }

    /// Authorization header values seen.
    #[must_use]
    pub fn auth_headers(&self) -> Vec<String> {
        self.state.auth_headers.lock().unwrap().clone()
    }
}

async fn relay_send_text(
    State(state): State<Arc<RelayInner>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if state.fail.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }

    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        state.auth_headers.lock().unwrap().push(auth.to_string());
    }
    state.messages.lock().unwrap().push(body);

    Json(json!({ "status": "sent" })).into_response()
}

// =============================================================================
// Test application
// =============================================================================

/// The real router wired to mock upstreams.
pub struct TestApp {
    pub router: Router,
    pub store: MockDataStore,
    pub relay: MockRelay,
}

impl TestApp {
    /// Spawn both mocks and assemble the application around them.
    pub async fn spawn() -> Self {
        let store = MockDataStore::spawn().await;
        let relay = MockRelay::spawn().await;

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            data_store: DataStoreConfig {
                url: store.base_url(),
                service_key: SecretString::from("test-service-key"),
            },
            relay: RelayConfig {
                api_url: relay.base_url(),
                api_token: SecretString::from("test-relay-token"),
                receiver_phone: "5511999999999".to_string(),
            },
            sentry_dsn: None,
        };

        let state = AppState::new(config).expect("build app state");

        Self {
            router: routes::app(state),
            store,
            relay,
        }
    }

    /// Drive one request through the router, returning the status and
    /// the JSON body (`null` for empty or non-JSON bodies).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder
                .header("x-user-id", user.id.to_string())
                .header("x-user-name", &user.name)
                .header("x-user-email", &user.email);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, path: &str, user: Option<&TestUser>) -> (StatusCode, Value) {
        self.request(Method::GET, path, user, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        user: Option<&TestUser>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, path, user, Some(body)).await
    }
}
