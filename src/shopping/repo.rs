use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ownership::Owned;

/// One entry on the user's shopping list. Category, quantity and unit
/// are optional free-form hints; priority is 1 high, 2 medium, 3 low.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub priority: i32,
    pub purchased: bool,
    pub date_added: OffsetDateTime,
}

impl Owned for ShoppingItem {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct ShoppingItemFields {
    pub name: String,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub priority: i32,
}

impl ShoppingItem {
    /// The list as the user reads it: urgent first, bought items sink,
    /// insertion order breaks the remaining ties.
    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> Result<Vec<ShoppingItem>, sqlx::Error> {
        sqlx::query_as::<_, ShoppingItem>(
            r#"
            SELECT id, user_id, name, category, quantity, unit, priority, purchased, date_added
            FROM shopping_items
            WHERE user_id = $1
            ORDER BY priority ASC, purchased ASC, date_added ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<ShoppingItem>, sqlx::Error> {
        sqlx::query_as::<_, ShoppingItem>(
            r#"
            SELECT id, user_id, name, category, quantity, unit, priority, purchased, date_added
            FROM shopping_items
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
        fields: &ShoppingItemFields,
    ) -> Result<ShoppingItem, sqlx::Error> {
        sqlx::query_as::<_, ShoppingItem>(
            r#"
            INSERT INTO shopping_items (user_id, name, category, quantity, unit, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, category, quantity, unit, priority, purchased, date_added
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.quantity)
        .bind(&fields.unit)
        .bind(fields.priority)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM shopping_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Flip the purchased flag in a single statement and report the new
    /// state.
    pub async fn toggle(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE shopping_items
            SET purchased = NOT purchased
            WHERE id = $1
            RETURNING purchased
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await
    }

    /// Names of everything still waiting to be bought.
    pub async fn unpurchased_names(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM shopping_items
            WHERE user_id = $1 AND purchased = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Insert one generated entry inside the generator's transaction.
    /// Quantity stays unset; the priority is the caller's restock level.
    pub async fn insert_restock(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        name: &str,
        category: &str,
        unit: &str,
        priority: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO shopping_items (user_id, name, category, unit, priority)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(category)
        .bind(unit)
        .bind(priority)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
