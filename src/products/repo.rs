use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ownership::Owned;

/// A perishable product sitting in the user's fridge.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: OffsetDateTime,
    pub date_added: OffsetDateTime,
}

impl Owned for Product {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// The mutable fields of a product; `date_added` never changes after
/// creation.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: OffsetDateTime,
}

impl Product {
    /// All products of one user, newest first, optionally filtered by a
    /// case-insensitive substring of the name.
    pub async fn list_by_owner(
        db: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        match search {
            Some(q) if !q.is_empty() => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, user_id, name, category, quantity, unit, expiry_date, date_added
                    FROM products
                    WHERE user_id = $1 AND name ILIKE '%' || $2 || '%'
                    ORDER BY date_added DESC
                    "#,
                )
                .bind(user_id)
                .bind(q)
                .fetch_all(db)
                .await
            }
            _ => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, user_id, name, category, quantity, unit, expiry_date, date_added
                    FROM products
                    WHERE user_id = $1
                    ORDER BY date_added DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(db)
                .await
            }
        }
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, user_id, name, category, quantity, unit, expiry_date, date_added
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (user_id, name, category, quantity, unit, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, category, quantity, unit, expiry_date, date_added
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.quantity)
        .bind(&fields.unit)
        .bind(fields.expiry_date)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, category = $3, quantity = $4, unit = $5, expiry_date = $6
            WHERE id = $1
            RETURNING id, user_id, name, category, quantity, unit, expiry_date, date_added
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.quantity)
        .bind(&fields.unit)
        .bind(fields.expiry_date)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Products running out: quantity strictly below the restock threshold.
    pub async fn low_stock(
        db: &PgPool,
        user_id: Uuid,
        threshold: f64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, user_id, name, category, quantity, unit, expiry_date, date_added
            FROM products
            WHERE user_id = $1 AND quantity < $2
            ORDER BY date_added DESC
            "#,
        )
        .bind(user_id)
        .bind(threshold)
        .fetch_all(db)
        .await
    }

    /// Distinct categories of the user's own products.
    pub async fn categories_by_owner(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT category
            FROM products
            WHERE user_id = $1
            ORDER BY category
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
