//! Order submission flow.
//!
//! Checkout runs once, fanning out to the data store (persist the order
//! and its line items) and the chat relay (dispatch the summary). The
//! order is persisted before the message is sent: a relay failure after
//! persistence leaves an order with no outbound message. That window is
//! accepted and not reconciled here - the order's status field records
//! which orders a future pass would need to resend.

use rust_decimal::Decimal;
use thiserror::Error;

use stg_catalog_core::{OrderId, UserId};

use crate::gateway::GatewayError;
use crate::gateway::types::OrderLineItemInput;
use crate::services::Notifier;
use crate::services::cart::{CartGateway, CartManager};
use crate::services::messages::{OrderMessageItem, order_message};
use crate::services::relay::{MessageRelay, RelayError};

/// Data store operations the order submission flow depends on.
pub trait OrderGateway: Send + Sync {
    /// Persist an order, returning the new order's ID.
    async fn create_order(&self, user_id: UserId, total: Decimal) -> Result<OrderId, GatewayError>;

    /// Persist the order's line items, unit prices captured at order
    /// time.
    async fn create_order_line_items(
        &self,
        order_id: OrderId,
        items: &[OrderLineItemInput],
    ) -> Result<(), GatewayError>;
}

/// Errors that abort the order submission flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The flow requires a signed-in identity.
    #[error("checkout requires a signed-in user")]
    NotSignedIn,

    /// The flow requires a non-empty cart.
    #[error("checkout requires a non-empty cart")]
    EmptyCart,

    /// Persisting the order failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Dispatching the order message failed.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Submit the current cart as an order.
///
/// Persists the order and its line items, formats the summary message,
/// dispatches it through the relay, and clears the cart on relay
/// success. Any failure aborts the remaining steps and leaves the cart
/// untouched; already-persisted order rows are not rolled back. One
/// notification reports the outcome either way.
///
/// # Errors
///
/// `NotSignedIn`/`EmptyCart` when the preconditions fail (the flow does
/// not start and nothing is notified); `Gateway`/`Relay` when a step
/// fails mid-flight.
pub async fn submit_order<G, O, R>(
    cart: &mut CartManager<G>,
    orders: &O,
    relay: &R,
    notifier: &dyn Notifier,
) -> Result<OrderId, CheckoutError>
where
    G: CartGateway,
    O: OrderGateway,
    R: MessageRelay,
{
    let Some(identity) = cart.identity().cloned() else {
        return Err(CheckoutError::NotSignedIn);
    };
    if cart.items().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let result = run(cart, orders, relay, &identity).await;

    match &result {
        Ok(order_id) => {
            tracing::info!(order_id = %order_id, "order submitted");
            notifier.success(
                "Pedido enviado com sucesso!",
                Some("Seu pedido foi registrado e enviado via WhatsApp"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "checkout failed");
            notifier.error(
                "Erro ao processar pedido",
                Some("Tente novamente em alguns instantes"),
            );
        }
    }

    result
}

async fn run<G, O, R>(
    cart: &mut CartManager<G>,
    orders: &O,
    relay: &R,
    identity: &crate::models::Identity,
) -> Result<OrderId, CheckoutError>
where
    G: CartGateway,
    O: OrderGateway,
    R: MessageRelay,
{
    let total = cart.total();

    let order_id = orders.create_order(identity.id, total).await?;

    let line_items: Vec<OrderLineItemInput> = cart
        .items()
        .iter()
        .map(|item| OrderLineItemInput {
            product_id: item.product.id,
            quantity: item.quantity,
            price: item.price(),
        })
        .collect();
    orders.create_order_line_items(order_id, &line_items).await?;

    let message_items: Vec<OrderMessageItem> = cart
        .items()
        .iter()
        .map(|item| OrderMessageItem {
            name: item.product.name.clone(),
            quantity: item.quantity,
            price: item.price(),
        })
        .collect();
    let message = order_message(
        identity.display_name(),
        identity.contact_email(),
        &message_items,
        total,
    );

    relay.send_order_message(&message).await?;

    // Relay confirmed - the cart clears its own failures, so a failed
    // clear leaves the order submitted and the cart intact.
    cart.clear().await;

    Ok(order_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::LocalCaches;
    use crate::services::testing::{
        FakeRelay, InMemoryCartGateway, InMemoryOrderGateway, RecordingNotifier, identity, product,
    };

    async fn loaded_cart(
        gateway: InMemoryCartGateway,
    ) -> (CartManager<InMemoryCartGateway>, LocalCaches) {
        let caches = LocalCaches::new();
        let mut cart = CartManager::new(
            gateway,
            caches.cart_snapshots().clone(),
            Arc::new(RecordingNotifier::default()),
        );
        cart.sign_in(identity()).await;
        (cart, caches)
    }

    #[tokio::test]
    async fn test_submit_order_persists_and_clears_cart() {
        let (mut cart, caches) = loaded_cart(InMemoryCartGateway::default()).await;
        cart.add_item(&product("Widget", "10.00"), 2).await;
        let user_id = cart.identity().unwrap().id;

        let orders = InMemoryOrderGateway::default();
        let relay = FakeRelay::default();
        let notifier = RecordingNotifier::default();

        let order_id = submit_order(&mut cart, &orders, &relay, &notifier)
            .await
            .unwrap();

        // Order row with the cart total, line items with captured price
        let (order_user, order_total) = orders.order(order_id).unwrap();
        assert_eq!(order_user, user_id);
        assert_eq!(order_total, Decimal::from(20));
        let lines = orders.line_items(order_id);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, Decimal::from(10));

        // Relay success clears the cart and its snapshot
        assert!(cart.items().is_empty());
        assert!(caches.cart_snapshots().get(user_id).is_none());
        assert_eq!(notifier.successes(), vec!["Pedido enviado com sucesso!"]);
    }

    #[tokio::test]
    async fn test_submit_order_message_contents() {
        let (mut cart, _caches) = loaded_cart(InMemoryCartGateway::default()).await;
        cart.add_item(&product("Widget", "10.00"), 2).await;

        let orders = InMemoryOrderGateway::default();
        let relay = FakeRelay::default();

        submit_order(&mut cart, &orders, &relay, &RecordingNotifier::default())
            .await
            .unwrap();

        let sent = relay.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("- Widget - Qtd: 2 - R$ 20,00"));
        assert!(sent[0].contains("TOTAL: R$ 20,00"));
        assert!(sent[0].contains("Cliente: Maria"));
    }

    #[tokio::test]
    async fn test_relay_failure_keeps_cart_and_order_rows() {
        let (mut cart, caches) = loaded_cart(InMemoryCartGateway::default()).await;
        cart.add_item(&product("Widget", "10.00"), 2).await;
        let user_id = cart.identity().unwrap().id;

        let orders = InMemoryOrderGateway::default();
        let relay = FakeRelay::default();
        relay.fail_next();
        let notifier = RecordingNotifier::default();

        let result = submit_order(&mut cart, &orders, &relay, &notifier).await;

        assert!(matches!(result, Err(CheckoutError::Relay(_))));
        // Cart retains its pre-checkout contents
        assert_eq!(cart.items().len(), 1);
        assert!(caches.cart_snapshots().get(user_id).is_some());
        // The persisted order is not rolled back
        assert_eq!(orders.order_count(), 1);
        assert_eq!(notifier.errors(), vec!["Erro ao processar pedido"]);
    }

    #[tokio::test]
    async fn test_order_persist_failure_aborts_before_relay() {
        let (mut cart, _caches) = loaded_cart(InMemoryCartGateway::default()).await;
        cart.add_item(&product("Widget", "10.00"), 1).await;

        let orders = InMemoryOrderGateway::default();
        orders.fail_next();
        let relay = FakeRelay::default();

        let result =
            submit_order(&mut cart, &orders, &relay, &RecordingNotifier::default()).await;

        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
        assert!(relay.sent().is_empty(), "relay must not be called");
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_does_not_start_the_flow() {
        let (mut cart, _caches) = loaded_cart(InMemoryCartGateway::default()).await;

        let orders = InMemoryOrderGateway::default();
        let relay = FakeRelay::default();
        let notifier = RecordingNotifier::default();

        let result = submit_order(&mut cart, &orders, &relay, &notifier).await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(orders.order_count(), 0);
        assert!(relay.sent().is_empty());
        assert!(notifier.errors().is_empty(), "preconditions do not notify");
    }

    #[tokio::test]
    async fn test_signed_out_cart_does_not_start_the_flow() {
        let cart_gateway = InMemoryCartGateway::default();
        let caches = LocalCaches::new();
        let mut cart = CartManager::new(
            cart_gateway,
            caches.cart_snapshots().clone(),
            Arc::new(RecordingNotifier::default()),
        );

        let result = submit_order(
            &mut cart,
            &InMemoryOrderGateway::default(),
            &FakeRelay::default(),
            &RecordingNotifier::default(),
        )
        .await;

        assert!(matches!(result, Err(CheckoutError::NotSignedIn)));
    }
}
