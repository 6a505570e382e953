//! Recipe hints built from whatever is still edible in the fridge.

use serde::Serialize;
use time::OffsetDateTime;

use super::repo::Product;

pub const CATEGORY_VEGETABLES: &str = "Vegetables";
pub const CATEGORY_MEAT: &str = "Meat";
pub const CATEGORY_DAIRY: &str = "Dairy";
pub const CATEGORY_FRUITS: &str = "Fruits";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSuggestion {
    pub name: String,
    pub description: String,
    pub products: Vec<String>,
}

/// Suggest dishes from the non-expired products. Needs at least two
/// edible products to bother; ingredient lists keep storage order and
/// are capped per recipe.
pub fn recipe_suggestions(products: &[Product], now: OffsetDateTime) -> Vec<RecipeSuggestion> {
    let valid: Vec<&Product> = products.iter().filter(|p| !p.is_expired(now)).collect();
    if valid.len() < 2 {
        return Vec::new();
    }

    let has = |category: &str| valid.iter().any(|p| p.category == category);
    let names = |categories: &[&str], limit: usize| -> Vec<String> {
        valid
            .iter()
            .filter(|p| categories.contains(&p.category.as_str()))
            .take(limit)
            .map(|p| p.name.clone())
            .collect()
    };

    let mut suggestions = Vec::new();

    if has(CATEGORY_VEGETABLES) && has(CATEGORY_MEAT) {
        suggestions.push(RecipeSuggestion {
            name: "Meat with vegetables".into(),
            description: "A simple and tasty dish of meat with vegetables.".into(),
            products: names(&[CATEGORY_VEGETABLES, CATEGORY_MEAT], 4),
        });
    }

    if has(CATEGORY_DAIRY) && has(CATEGORY_FRUITS) {
        suggestions.push(RecipeSuggestion {
            name: "Fruit smoothie".into(),
            description: "A refreshing smoothie of fruit and dairy.".into(),
            products: names(&[CATEGORY_DAIRY, CATEGORY_FRUITS], 3),
        });
    }

    suggestions
}
