use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::ApiError;

use super::freshness::FridgeRank;
use super::recipes::RecipeSuggestion;
use super::repo::{Product, ProductFields};

/// Expiry dates come in as plain calendar dates and are stored as
/// midnight UTC.
const EXPIRY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn parse_expiry_date(raw: &str) -> Result<OffsetDateTime, ApiError> {
    let date = Date::parse(raw.trim(), EXPIRY_FORMAT)
        .map_err(|_| ApiError::Validation("expiry_date must be a YYYY-MM-DD date".into()))?;
    Ok(date.midnight().assume_utc())
}

fn build_fields(
    name: &str,
    category: &str,
    quantity: f64,
    unit: &str,
    expiry_date: &str,
) -> Result<ProductFields, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(ApiError::Validation("category is required".into()));
    }
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(ApiError::Validation("unit is required".into()));
    }
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ApiError::Validation(
            "quantity must be a non-negative number".into(),
        ));
    }

    Ok(ProductFields {
        name: name.to_owned(),
        category: category.to_owned(),
        quantity,
        unit: unit.to_owned(),
        expiry_date: parse_expiry_date(expiry_date)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: String, // YYYY-MM-DD
}

impl CreateProductRequest {
    pub fn into_fields(self) -> Result<ProductFields, ApiError> {
        build_fields(
            &self.name,
            &self.category,
            self.quantity,
            &self.unit,
            &self.expiry_date,
        )
    }
}

/// A full replacement of the mutable fields; `date_added` stays as it was.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: String, // YYYY-MM-DD
}

impl UpdateProductRequest {
    pub fn into_fields(self) -> Result<ProductFields, ApiError> {
        build_fields(
            &self.name,
            &self.category,
            self.quantity,
            &self.unit,
            &self.expiry_date,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// A product as the client sees it, stored fields plus the derived ones.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_added: OffsetDateTime,
    pub is_expired: bool,
    pub days_until_expiry: i64,
    pub days_in_fridge: i64,
    pub rank: FridgeRank,
}

impl ProductView {
    pub fn new(product: &Product, now: OffsetDateTime) -> ProductView {
        ProductView {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            quantity: product.quantity,
            unit: product.unit.clone(),
            expiry_date: product.expiry_date,
            date_added: product.date_added,
            is_expired: product.is_expired(now),
            days_until_expiry: product.days_until_expiry(now),
            days_in_fridge: product.days_in_fridge(now),
            rank: product.rank(now),
        }
    }
}

/// An expired product together with its goodbye line.
#[derive(Debug, Serialize)]
pub struct ExpiredProduct {
    #[serde(flatten)]
    pub product: ProductView,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub products: Vec<ProductView>,
    pub expired: Vec<ExpiredProduct>,
    pub expiring_soon: Vec<ProductView>,
    pub suggestions: Vec<RecipeSuggestion>,
    pub veterans: Vec<ProductView>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub longest_living: Vec<ProductView>,
    pub categories: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn request(expiry_date: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: "Milk".into(),
            category: "Dairy".into(),
            quantity: 1.0,
            unit: "l".into(),
            expiry_date: expiry_date.into(),
        }
    }

    #[test]
    fn expiry_date_parses_to_midnight_utc() {
        let fields = request("2024-05-10").into_fields().unwrap();
        assert_eq!(fields.expiry_date, datetime!(2024-05-10 0:00 UTC));
    }

    #[test]
    fn expiry_date_is_trimmed_before_parsing() {
        let fields = request("  2024-05-10  ").into_fields().unwrap();
        assert_eq!(fields.expiry_date, datetime!(2024-05-10 0:00 UTC));
    }

    #[test]
    fn bad_expiry_dates_are_rejected() {
        for raw in ["10.05.2024", "2024-13-01", "yesterday", ""] {
            let err = request(raw).into_fields().unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "input {raw:?}");
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut req = request("2024-05-10");
        req.name = "   ".into();
        let err = req.into_fields().unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn negative_and_non_finite_quantities_are_rejected() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let mut req = request("2024-05-10");
            req.quantity = bad;
            assert!(req.into_fields().is_err(), "quantity {bad}");
        }
    }

    #[test]
    fn zero_quantity_is_allowed() {
        let mut req = request("2024-05-10");
        req.quantity = 0.0;
        assert!(req.into_fields().is_ok());
    }

    #[test]
    fn text_fields_are_stored_trimmed() {
        let mut req = request("2024-05-10");
        req.name = "  Milk  ".into();
        req.unit = " l ".into();
        let fields = req.into_fields().unwrap();
        assert_eq!(fields.name, "Milk");
        assert_eq!(fields.unit, "l");
    }

    #[test]
    fn view_carries_the_derived_fields() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let product = Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Kefir".into(),
            category: "Dairy".into(),
            quantity: 1.0,
            unit: "l".into(),
            expiry_date: now - Duration::days(1),
            date_added: now - Duration::days(2),
        };

        let view = ProductView::new(&product, now);
        assert!(view.is_expired);
        assert_eq!(view.days_until_expiry, -1);
        assert_eq!(view.days_in_fridge, 2);
        assert_eq!(view.rank, FridgeRank::Rookie);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["rank"], "Rookie");
        assert_eq!(json["expiry_date"], "2024-05-09T12:00:00Z");
    }

    #[test]
    fn expired_view_flattens_the_product() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let product = Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ham".into(),
            category: "Meat".into(),
            quantity: 1.0,
            unit: "pcs".into(),
            expiry_date: now - Duration::days(3),
            date_added: now - Duration::days(10),
        };

        let expired = ExpiredProduct {
            product: ProductView::new(&product, now),
            message: "The Ham is done for. Clear the shelf.".into(),
        };
        let json = serde_json::to_value(&expired).unwrap();
        assert_eq!(json["name"], "Ham");
        assert!(json["message"].as_str().unwrap().contains("Ham"));
    }
}
