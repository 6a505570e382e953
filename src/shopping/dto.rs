use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

use super::repo::{ShoppingItem, ShoppingItemFields};

fn default_priority() -> i32 {
    2
}

#[derive(Debug, Deserialize)]
pub struct CreateShoppingItemRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl CreateShoppingItemRequest {
    pub fn into_fields(self) -> Result<ShoppingItemFields, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("name is required".into()));
        }
        if !(1..=3).contains(&self.priority) {
            return Err(ApiError::Validation(
                "priority must be 1 (high), 2 (medium) or 3 (low)".into(),
            ));
        }
        if let Some(quantity) = self.quantity {
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(ApiError::Validation(
                    "quantity must be a non-negative number".into(),
                ));
            }
        }

        // Blank optional fields come in as "" from lazy clients; store
        // them as absent.
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        Ok(ShoppingItemFields {
            name: name.to_owned(),
            category: clean(self.category),
            quantity: self.quantity,
            unit: clean(self.unit),
            priority: self.priority,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ShoppingItemView {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub priority: i32,
    pub purchased: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_added: OffsetDateTime,
}

impl From<ShoppingItem> for ShoppingItemView {
    fn from(item: ShoppingItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            unit: item.unit,
            priority: item.priority,
            purchased: item.purchased,
            date_added: item.date_added,
        }
    }
}

/// Body of the toggle response: the state the item ended up in.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub purchased: bool,
}

/// Body of the generate response: how many entries were added.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub added: usize,
}
