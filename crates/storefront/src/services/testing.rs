//! In-memory fakes for exercising the services without a network.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;

use stg_catalog_core::{CartItemId, OrderId, ProductId, UserId};

use crate::gateway::GatewayError;
use crate::gateway::types::{CartItem, OrderLineItemInput, Product};
use crate::models::Identity;
use crate::services::Notifier;
use crate::services::cart::CartGateway;
use crate::services::checkout::OrderGateway;
use crate::services::relay::{MessageRelay, RelayError};
use crate::services::wishlist::WishlistGateway;

/// Test product with a fixed category and timestamp.
pub(crate) fn product(name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(uuid::Uuid::new_v4()),
        name: name.to_string(),
        description: format!("{name} de teste"),
        price: Decimal::from_str(price).expect("valid test price"),
        image_url: String::new(),
        category: "geral".to_string(),
        created_at: Utc::now(),
    }
}

/// Test identity with a name and email.
pub(crate) fn identity() -> Identity {
    Identity {
        id: UserId::new(uuid::Uuid::new_v4()),
        name: Some("Maria".to_string()),
        email: Some("maria@test.com".to_string()),
    }
}

fn injected_failure() -> GatewayError {
    GatewayError::Api {
        status: 500,
        message: "injected failure".to_string(),
    }
}

// =============================================================================
// Notifier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
struct Notification {
    kind: NotificationKind,
    message: String,
    description: Option<String>,
}

/// Notifier that records every notification for assertions.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.messages(&NotificationKind::Success)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(&NotificationKind::Error)
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("notifier lock")
            .iter()
            .filter_map(|event| event.description.clone())
            .collect()
    }

    fn messages(&self, kind: &NotificationKind) -> Vec<String> {
        self.events
            .lock()
            .expect("notifier lock")
            .iter()
            .filter(|event| event.kind == *kind)
            .map(|event| event.message.clone())
            .collect()
    }

    fn record(&self, kind: NotificationKind, message: &str, description: Option<&str>) {
        self.events.lock().expect("notifier lock").push(Notification {
            kind,
            message: message.to_string(),
            description: description.map(ToString::to_string),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str, description: Option<&str>) {
        self.record(NotificationKind::Success, message, description);
    }

    fn error(&self, message: &str, description: Option<&str>) {
        self.record(NotificationKind::Error, message, description);
    }
}

// =============================================================================
// Cart gateway
// =============================================================================

#[derive(Default)]
struct CartGatewayState {
    rows: Mutex<Vec<(UserId, CartItem)>>,
    fail_next: AtomicBool,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

/// Cart store fake keeping rows in memory.
///
/// Rows written through the gateway carry a placeholder product; tests
/// that read the cart back seed rows with [`InMemoryCartGateway::seed`].
#[derive(Clone, Default)]
pub(crate) struct InMemoryCartGateway {
    state: Arc<CartGatewayState>,
}

impl InMemoryCartGateway {
    pub fn seed(&self, user_id: UserId, product: &Product, quantity: u32) {
        self.state.rows.lock().expect("rows lock").push((
            user_id,
            CartItem {
                id: CartItemId::new(uuid::Uuid::new_v4()),
                product: product.clone(),
                quantity,
            },
        ));
    }

    /// Fail the next operation with a store error.
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn read_calls(&self) -> usize {
        self.state.read_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.state.write_calls.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.state.rows.lock().expect("rows lock").len()
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        if self.state.fail_next.swap(false, Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }

    fn placeholder(product_id: ProductId) -> Product {
        Product {
            id: product_id,
            name: "produto".to_string(),
            description: String::new(),
            price: Decimal::ZERO,
            image_url: String::new(),
            category: "geral".to_string(),
            created_at: Utc::now(),
        }
    }
}

impl CartGateway for InMemoryCartGateway {
    async fn read_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, GatewayError> {
        self.state.read_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self
            .state
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn write_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemId, GatewayError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let id = CartItemId::new(uuid::Uuid::new_v4());
        self.state.rows.lock().expect("rows lock").push((
            user_id,
            CartItem {
                id,
                product: Self::placeholder(product_id),
                quantity,
            },
        ));
        Ok(id)
    }

    async fn update_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        for (owner, item) in self.state.rows.lock().expect("rows lock").iter_mut() {
            if *owner == user_id && item.product.id == product_id {
                item.quantity = quantity;
            }
        }
        Ok(())
    }

    async fn delete_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.state
            .rows
            .lock()
            .expect("rows lock")
            .retain(|(owner, item)| !(*owner == user_id && item.product.id == product_id));
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), GatewayError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.state
            .rows
            .lock()
            .expect("rows lock")
            .retain(|(owner, _)| *owner != user_id);
        Ok(())
    }
}

// =============================================================================
// Wishlist gateway
// =============================================================================

#[derive(Default)]
struct WishlistGatewayState {
    rows: Mutex<Vec<(UserId, ProductId)>>,
    fail_next: AtomicBool,
}

/// Wishlist store fake keeping membership rows in memory.
#[derive(Clone, Default)]
pub(crate) struct InMemoryWishlistGateway {
    state: Arc<WishlistGatewayState>,
}

impl InMemoryWishlistGateway {
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        if self.state.fail_next.swap(false, Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }
}

impl WishlistGateway for InMemoryWishlistGateway {
    async fn read_wishlist(&self, _user_id: UserId) -> Result<Vec<Product>, GatewayError> {
        self.take_failure()?;
        // Membership rows only; tests load before adding.
        Ok(Vec::new())
    }

    async fn add_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.take_failure()?;
        self.state
            .rows
            .lock()
            .expect("rows lock")
            .push((user_id, product_id));
        Ok(())
    }

    async fn delete_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.take_failure()?;
        self.state
            .rows
            .lock()
            .expect("rows lock")
            .retain(|row| *row != (user_id, product_id));
        Ok(())
    }
}

// =============================================================================
// Order gateway
// =============================================================================

#[derive(Default)]
struct OrderGatewayState {
    orders: Mutex<Vec<(OrderId, UserId, Decimal)>>,
    line_items: Mutex<Vec<(OrderId, OrderLineItemInput)>>,
    fail_next: AtomicBool,
}

/// Order store fake recording persisted orders and line items.
#[derive(Clone, Default)]
pub(crate) struct InMemoryOrderGateway {
    state: Arc<OrderGatewayState>,
}

impl InMemoryOrderGateway {
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn order(&self, order_id: OrderId) -> Option<(UserId, Decimal)> {
        self.state
            .orders
            .lock()
            .expect("orders lock")
            .iter()
            .find(|(id, _, _)| *id == order_id)
            .map(|(_, user, total)| (*user, *total))
    }

    pub fn order_count(&self) -> usize {
        self.state.orders.lock().expect("orders lock").len()
    }

    pub fn line_items(&self, order_id: OrderId) -> Vec<OrderLineItemInput> {
        self.state
            .line_items
            .lock()
            .expect("line items lock")
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, item)| item.clone())
            .collect()
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        if self.state.fail_next.swap(false, Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }
}

impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, user_id: UserId, total: Decimal) -> Result<OrderId, GatewayError> {
        self.take_failure()?;
        let order_id = OrderId::new(uuid::Uuid::new_v4());
        self.state
            .orders
            .lock()
            .expect("orders lock")
            .push((order_id, user_id, total));
        Ok(order_id)
    }

    async fn create_order_line_items(
        &self,
        order_id: OrderId,
        items: &[OrderLineItemInput],
    ) -> Result<(), GatewayError> {
        self.take_failure()?;
        let mut line_items = self.state.line_items.lock().expect("line items lock");
        for item in items {
            line_items.push((order_id, item.clone()));
        }
        Ok(())
    }
}

// =============================================================================
// Relay
// =============================================================================

#[derive(Default)]
struct FakeRelayState {
    sent: Mutex<Vec<String>>,
    fail_next: AtomicBool,
}

/// Relay fake recording dispatched messages.
#[derive(Clone, Default)]
pub(crate) struct FakeRelay {
    state: Arc<FakeRelayState>,
}

impl FakeRelay {
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.sent.lock().expect("sent lock").clone()
    }
}

impl MessageRelay for FakeRelay {
    async fn send_order_message(&self, message: &str) -> Result<(), RelayError> {
        if self.state.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RelayError::Api {
                status: 500,
                message: "injected relay failure".to_string(),
            });
        }
        self.state
            .sent
            .lock()
            .expect("sent lock")
            .push(message.to_string());
        Ok(())
    }
}
