//! Shopping-list generation from products that are running out.

use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::repo::Product;

use super::repo::ShoppingItem;

/// A product counts as running out below this quantity.
pub const LOW_STOCK_THRESHOLD: f64 = 2.0;

/// Generated entries land at the top of the list.
pub const RESTOCK_PRIORITY: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockItem {
    pub name: String,
    pub category: String,
    pub unit: String,
}

/// Decide which low-stock products need a new shopping-list entry.
/// Matching against the existing unpurchased names is case-insensitive,
/// and a name planned earlier in the same run blocks its duplicates.
pub fn plan_restock(low_stock: &[Product], unpurchased_names: &[String]) -> Vec<RestockItem> {
    let mut seen: HashSet<String> = unpurchased_names
        .iter()
        .map(|name| name.to_lowercase())
        .collect();

    let mut planned = Vec::new();
    for product in low_stock {
        if seen.insert(product.name.to_lowercase()) {
            planned.push(RestockItem {
                name: product.name.clone(),
                category: product.category.clone(),
                unit: product.unit.clone(),
            });
        }
    }
    planned
}

/// Add every planned restock entry to the user's shopping list. The
/// inserts run in one transaction: either the whole batch lands or the
/// list stays as it was. Returns how many entries were added.
pub async fn generate_from_low_stock(db: &PgPool, user_id: Uuid) -> Result<usize, ApiError> {
    let low_stock = Product::low_stock(db, user_id, LOW_STOCK_THRESHOLD).await?;
    let existing = ShoppingItem::unpurchased_names(db, user_id).await?;

    let planned = plan_restock(&low_stock, &existing);
    if planned.is_empty() {
        return Ok(0);
    }

    let mut tx = db.begin().await?;
    for item in &planned {
        ShoppingItem::insert_restock(
            &mut tx,
            user_id,
            &item.name,
            &item.category,
            &item.unit,
            RESTOCK_PRIORITY,
        )
        .await?;
    }
    tx.commit().await?;

    info!(%user_id, added = planned.len(), "shopping list generated from low stock");
    Ok(planned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::OffsetDateTime;

    fn low_stock_product(name: &str, category: &str, unit: &str) -> Product {
        let now: OffsetDateTime = datetime!(2024-05-10 12:00 UTC);
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            quantity: 0.5,
            unit: unit.into(),
            expiry_date: now,
            date_added: now,
        }
    }

    #[test]
    fn plans_every_unmatched_product() {
        let low = vec![
            low_stock_product("Milk", "Dairy", "l"),
            low_stock_product("Eggs", "Dairy", "pcs"),
        ];
        let planned = plan_restock(&low, &[]);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].name, "Milk");
        assert_eq!(planned[0].category, "Dairy");
        assert_eq!(planned[0].unit, "l");
    }

    #[test]
    fn existing_names_match_case_insensitively() {
        let low = vec![
            low_stock_product("Milk", "Dairy", "l"),
            low_stock_product("Eggs", "Dairy", "pcs"),
        ];
        let existing = vec!["MILK".to_string()];
        let planned = plan_restock(&low, &existing);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].name, "Eggs");
    }

    #[test]
    fn duplicate_low_stock_names_collapse_into_one_entry() {
        let low = vec![
            low_stock_product("Eggs", "Dairy", "pcs"),
            low_stock_product("eggs", "Dairy", "pcs"),
        ];
        let planned = plan_restock(&low, &[]);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].name, "Eggs");
    }

    #[test]
    fn purchased_items_do_not_block_planning() {
        // Only unpurchased names are handed in, so a bought "Milk" is
        // simply absent from the list.
        let low = vec![low_stock_product("Milk", "Dairy", "l")];
        let planned = plan_restock(&low, &[]);
        assert_eq!(planned.len(), 1);
    }

    #[test]
    fn a_second_run_plans_nothing() {
        let low = vec![
            low_stock_product("Milk", "Dairy", "l"),
            low_stock_product("Eggs", "Dairy", "pcs"),
        ];
        let existing: Vec<String> = Vec::new();

        let first = plan_restock(&low, &existing);
        assert_eq!(first.len(), 2);

        let after: Vec<String> = first.iter().map(|item| item.name.clone()).collect();
        assert!(plan_restock(&low, &after).is_empty());
    }
}
