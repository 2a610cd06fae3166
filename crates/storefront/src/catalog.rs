//! Catalog query builder.
//!
//! Maps the UI-level filter state (selected category, free-text query,
//! price-range bounds, combined sort token) onto the gateway's
//! filter/sort parameters. Pure translation: no I/O, no business logic
//! beyond coercion and defaults.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::gateway::types::{ProductFilter, ProductSort, SortField};

/// Sort token used when the UI sends none.
const DEFAULT_SORT: &str = "created_at";

/// Filter selections as they arrive from the UI.
///
/// The sort value is a combined `"<field>-<direction>"` token, e.g.
/// `price-desc`; a bare field name sorts ascending.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSelections {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
}

/// Build the gateway query for a set of filter selections.
///
/// Blank strings count as absent; an absent price bound imposes no
/// constraint on that side; unknown sort fields fall back to creation
/// time.
#[must_use]
pub fn build_product_query(selections: &FilterSelections) -> (ProductFilter, ProductSort) {
    let filter = ProductFilter {
        category: normalize(selections.category.as_deref()),
        search: normalize(selections.search.as_deref()),
        min_price: selections.min_price,
        max_price: selections.max_price,
    };

    let token = selections
        .sort
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .unwrap_or(DEFAULT_SORT);

    (filter, parse_sort_token(token))
}

/// Trim a selection and treat blank values as absent.
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Parse a `"<field>-<direction>"` token into discrete sort parameters.
fn parse_sort_token(token: &str) -> ProductSort {
    let (field, direction) = match token.rsplit_once('-') {
        Some((field, direction)) => (field, Some(direction)),
        None => (token, None),
    };

    let field = match field {
        "price" => SortField::Price,
        "name" => SortField::Name,
        // "created_at" and anything unrecognized
        _ => SortField::CreatedAt,
    };

    ProductSort {
        field,
        ascending: direction != Some("desc"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selections_default_to_created_at_ascending() {
        let (filter, sort) = build_product_query(&FilterSelections::default());
        assert_eq!(filter, ProductFilter::default());
        assert_eq!(sort.field, SortField::CreatedAt);
        assert!(sort.ascending);
    }

    #[test]
    fn test_sort_token_parsing() {
        let cases = [
            ("created_at-desc", SortField::CreatedAt, false),
            ("created_at-asc", SortField::CreatedAt, true),
            ("price-asc", SortField::Price, true),
            ("price-desc", SortField::Price, false),
            ("name-asc", SortField::Name, true),
            ("name-desc", SortField::Name, false),
            // Bare field sorts ascending
            ("price", SortField::Price, true),
        ];

        for (token, field, ascending) in cases {
            let sort = parse_sort_token(token);
            assert_eq!(sort.field, field, "token {token}");
            assert_eq!(sort.ascending, ascending, "token {token}");
        }
    }

    #[test]
    fn test_unknown_sort_field_falls_back_to_created_at() {
        let sort = parse_sort_token("rating-desc");
        assert_eq!(sort.field, SortField::CreatedAt);
        assert!(!sort.ascending);
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let selections = FilterSelections {
            category: Some("  ".to_string()),
            search: Some(String::new()),
            sort: Some("   ".to_string()),
            ..FilterSelections::default()
        };
        let (filter, sort) = build_product_query(&selections);
        assert_eq!(filter.category, None);
        assert_eq!(filter.search, None);
        assert_eq!(sort.field, SortField::CreatedAt);
    }

    #[test]
    fn test_bounds_pass_through() {
        let selections = FilterSelections {
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(50)),
            category: Some("cozinha".to_string()),
            search: Some("caneca".to_string()),
            sort: Some("price-desc".to_string()),
        };
        let (filter, sort) = build_product_query(&selections);
        assert_eq!(filter.min_price, Some(Decimal::from(10)));
        assert_eq!(filter.max_price, Some(Decimal::from(50)));
        assert_eq!(filter.category.as_deref(), Some("cozinha"));
        assert_eq!(filter.search.as_deref(), Some("caneca"));
        assert_eq!(sort.field, SortField::Price);
        assert!(!sort.ascending);
    }
}
