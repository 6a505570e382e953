//! "You buy this a lot" hints derived from the product history.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::products::repo::Product;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingSuggestion {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub frequency: i64,
}

/// Group the user's products by (name, category, unit), count each group
/// and keep the `top_n` most frequent. Ties are deterministic: the
/// BTreeMap yields keys in ascending order and the stable sort keeps that
/// order among equal counts.
pub fn purchase_suggestions(products: &[Product], top_n: usize) -> Vec<ShoppingSuggestion> {
    let mut counts: BTreeMap<(String, String, String), i64> = BTreeMap::new();
    for product in products {
        let key = (
            product.name.clone(),
            product.category.clone(),
            product.unit.clone(),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut suggestions: Vec<ShoppingSuggestion> = counts
        .into_iter()
        .map(|((name, category, unit), frequency)| ShoppingSuggestion {
            name,
            category,
            unit,
            frequency,
        })
        .collect();
    suggestions.sort_by_key(|s| Reverse(s.frequency));
    suggestions.truncate(top_n);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn product(name: &str, category: &str, unit: &str) -> Product {
        let now: OffsetDateTime = datetime!(2024-05-10 12:00 UTC);
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            quantity: 1.0,
            unit: unit.into(),
            expiry_date: now,
            date_added: now,
        }
    }

    #[test]
    fn most_frequent_comes_first() {
        let history = vec![
            product("Milk", "Dairy", "l"),
            product("Bread", "Bakery", "pcs"),
            product("Bread", "Bakery", "pcs"),
            product("Milk", "Dairy", "l"),
            product("Bread", "Bakery", "pcs"),
            product("Eggs", "Dairy", "pcs"),
        ];

        let suggestions = purchase_suggestions(&history, DEFAULT_SUGGESTION_LIMIT);
        let ranked: Vec<(&str, i64)> = suggestions
            .iter()
            .map(|s| (s.name.as_str(), s.frequency))
            .collect();
        assert_eq!(ranked, vec![("Bread", 3), ("Milk", 2), ("Eggs", 1)]);
    }

    #[test]
    fn equal_counts_break_ties_by_name() {
        let history = vec![
            product("Banana", "Fruits", "pcs"),
            product("Apple", "Fruits", "pcs"),
            product("Banana", "Fruits", "pcs"),
            product("Apple", "Fruits", "pcs"),
        ];

        let suggestions = purchase_suggestions(&history, DEFAULT_SUGGESTION_LIMIT);
        let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Banana"]);
    }

    #[test]
    fn different_units_count_separately() {
        let history = vec![
            product("Milk", "Dairy", "l"),
            product("Milk", "Dairy", "l"),
            product("Milk", "Dairy", "ml"),
        ];

        let suggestions = purchase_suggestions(&history, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].unit, "l");
        assert_eq!(suggestions[0].frequency, 2);
        assert_eq!(suggestions[1].unit, "ml");
        assert_eq!(suggestions[1].frequency, 1);
    }

    #[test]
    fn output_is_capped() {
        let mut history = Vec::new();
        for i in 0..15 {
            history.push(product(&format!("Item {i:02}"), "Misc", "pcs"));
        }
        let suggestions = purchase_suggestions(&history, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(suggestions.len(), DEFAULT_SUGGESTION_LIMIT);
    }

    #[test]
    fn empty_history_suggests_nothing() {
        assert!(purchase_suggestions(&[], DEFAULT_SUGGESTION_LIMIT).is_empty());
    }
}
