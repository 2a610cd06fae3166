//! Locale-fixed currency formatting.
//!
//! The storefront sells in a single currency (Brazilian real) and the
//! rendering is pinned to the pt-BR convention: `R$` prefix, `.` as the
//! thousands separator, `,` as the decimal separator, always two decimal
//! places. The same rendering is used when composing order messages and
//! when displaying totals, so the two can never drift apart.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format a decimal amount as Brazilian currency, e.g. `R$ 1.234,56`.
///
/// The amount is rounded to two decimal places (midpoint away from zero)
/// before rendering. Negative amounts render with a leading minus sign:
/// `-R$ 1,00`.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .abs();

    // Split into integer and fractional parts; the fraction is exactly
    // two digits after rounding.
    let units = rounded.trunc();
    let cents = ((rounded - units) * Decimal::from(100))
        .round()
        .to_u32()
        .unwrap_or(0);

    let integer = group_thousands(&units.to_string());
    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}R$ {integer},{cents:02}")
}

/// Insert `.` separators every three digits, right to left.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let count = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_brl_simple() {
        assert_eq!(format_brl(dec("20.00")), "R$ 20,00");
        assert_eq!(format_brl(dec("20")), "R$ 20,00");
        assert_eq!(format_brl(dec("0")), "R$ 0,00");
    }

    #[test]
    fn test_format_brl_cents() {
        assert_eq!(format_brl(dec("0.5")), "R$ 0,50");
        assert_eq!(format_brl(dec("19.9")), "R$ 19,90");
        assert_eq!(format_brl(dec("19.99")), "R$ 19,99");
    }

    #[test]
    fn test_format_brl_groups_thousands() {
        assert_eq!(format_brl(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(format_brl(dec("1234567.89")), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec("1000")), "R$ 1.000,00");
    }

    #[test]
    fn test_format_brl_rounds_half_away_from_zero() {
        assert_eq!(format_brl(dec("1.005")), "R$ 1,01");
        assert_eq!(format_brl(dec("2.999")), "R$ 3,00");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(dec("-1")), "-R$ 1,00");
        assert_eq!(format_brl(dec("-1234.5")), "-R$ 1.234,50");
    }
}
