//! Order route handlers: checkout and the relay trigger endpoint.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::middleware::RequireIdentity;
use crate::services::checkout::{CheckoutError, submit_order};
use crate::services::messages::{OrderMessageItem, order_message};
use crate::services::relay::{MessageRelay, RelayError};
use crate::state::AppState;

/// Submit the current cart as an order.
///
/// Runs the full order submission flow: persist the order and its line
/// items, dispatch the summary through the chat relay, clear the cart on
/// relay success.
#[instrument(skip(state, identity))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Response {
    let mut cart = state.cart();
    cart.sign_in(identity).await;

    let notifier = state.notifier();
    let result = submit_order(&mut cart, state.gateway(), state.relay(), notifier.as_ref()).await;

    match result {
        Ok(order_id) => (
            StatusCode::OK,
            Json(json!({
                "message": "Pedido enviado com sucesso",
                "order_id": order_id,
            })),
        )
            .into_response(),
        Err(CheckoutError::EmptyCart) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Carrinho vazio" })),
        )
            .into_response(),
        Err(CheckoutError::NotSignedIn) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Não autenticado" })),
        )
            .into_response(),
        Err(CheckoutError::Gateway(_) | CheckoutError::Relay(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "message": "Erro ao processar pedido" })),
        )
            .into_response(),
    }
}

/// Relay trigger request. Every field is checked by hand so the endpoint
/// can answer the fixed 400 contract instead of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderRequest {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderMessageItem>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
}

/// Format an order summary and dispatch it through the chat relay.
///
/// Contract:
/// - 400 `{"message": "Dados incompletos"}` when a field is absent or
///   falsy (blank strings, zero total);
/// - 500 `{"message": "Erro ao enviar mensagem", "details": ...}` when
///   the relay answers non-2xx;
/// - 500 `{"message": "Erro interno", "error": ...}` on any other
///   failure;
/// - 200 `{"message": "Pedido enviado com sucesso"}` on success.
#[instrument(skip(state, request))]
pub async fn send_order(
    State(state): State<AppState>,
    Json(request): Json<SendOrderRequest>,
) -> Response {
    let (user_name, user_email, items, total) = match validate(&request) {
        Some(fields) => fields,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Dados incompletos" })),
            )
                .into_response();
        }
    };

    let message = order_message(user_name, user_email, items, total);

    match state.relay().send_order_message(&message).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Pedido enviado com sucesso" })),
        )
            .into_response(),
        Err(RelayError::Api { status, message }) => {
            tracing::error!(status, "relay rejected order message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Erro ao enviar mensagem",
                    "details": message,
                })),
            )
                .into_response()
        }
        Err(e @ RelayError::Http(_)) => {
            tracing::error!(error = %e, "failed to reach relay");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Erro interno",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Reject absent and falsy fields. An empty items array is present,
/// hence accepted.
fn validate(request: &SendOrderRequest) -> Option<(&str, &str, &[OrderMessageItem], Decimal)> {
    let user_name = request.user_name.as_deref().filter(|name| !name.is_empty())?;
    let user_email = request
        .user_email
        .as_deref()
        .filter(|email| !email.is_empty())?;
    let items = request.items.as_deref()?;
    let total = request.total.filter(|total| !total.is_zero())?;
    Some((user_name, user_email, items, total))
}
