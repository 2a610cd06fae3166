//! Order message composition.
//!
//! Builds the plain-text order summary dispatched through the chat
//! relay. The currency rendering comes from [`format_brl`] - the same
//! function the API uses for displayed totals, so the message and the UI
//! can never disagree on an amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stg_catalog_core::format_brl;

/// One order line as it appears in the message: name, quantity, unit
/// price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMessageItem {
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Compose the order summary text.
///
/// Fixed banner, customer name and email, one line per item with the
/// line subtotal, and a grand total line.
#[must_use]
pub fn order_message(
    user_name: &str,
    user_email: &str,
    items: &[OrderMessageItem],
    total: Decimal,
) -> String {
    let product_list = items
        .iter()
        .map(|item| {
            format!(
                "- {} - Qtd: {} - {}",
                item.name,
                item.quantity,
                format_brl(item.price * Decimal::from(item.quantity))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "*NOVO PEDIDO - STG CATALOG*\n\n\
         Cliente: {user_name}\n\
         Email: {user_email}\n\n\
         PRODUTOS:\n\
         {product_list}\n\n\
         TOTAL: {}\n\n\
         ---\n\
         Pedido realizado via STG Catalog",
        format_brl(total)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(name: &str, quantity: u32, price: &str) -> OrderMessageItem {
        OrderMessageItem {
            name: name.to_string(),
            quantity,
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_order_message_canonical_example() {
        let message = order_message(
            "Maria",
            "maria@test.com",
            &[item("Widget", 2, "10.00")],
            Decimal::from_str("20.00").unwrap(),
        );

        assert!(message.contains("- Widget - Qtd: 2 - R$ 20,00"));
        assert!(message.contains("TOTAL: R$ 20,00"));
    }

    #[test]
    fn test_order_message_structure() {
        let message = order_message(
            "Maria",
            "maria@test.com",
            &[item("Caneca", 1, "49.90"), item("Garrafa", 3, "10.00")],
            Decimal::from_str("79.90").unwrap(),
        );

        assert!(message.starts_with("*NOVO PEDIDO - STG CATALOG*"));
        assert!(message.contains("Cliente: Maria"));
        assert!(message.contains("Email: maria@test.com"));
        assert!(message.contains("- Caneca - Qtd: 1 - R$ 49,90"));
        assert!(message.contains("- Garrafa - Qtd: 3 - R$ 30,00"));
        assert!(message.contains("TOTAL: R$ 79,90"));
        assert!(message.ends_with("Pedido realizado via STG Catalog"));
    }

    #[test]
    fn test_item_lines_use_line_subtotals() {
        let message = order_message(
            "Maria",
            "maria@test.com",
            &[item("Caneca", 4, "1250.25")],
            Decimal::from_str("5001.00").unwrap(),
        );

        // 4 x 1250.25 = 5001.00, grouped pt-BR style
        assert!(message.contains("- Caneca - Qtd: 4 - R$ 5.001,00"));
        assert!(message.contains("TOTAL: R$ 5.001,00"));
    }
}
