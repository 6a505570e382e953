use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_joined: OffsetDateTime,
}

impl User {
    /// Find a user by username or email. Emails are stored lowercased,
    /// so the email arm compares the identifier lowercased; usernames
    /// match exactly.
    pub async fn find_by_identifier(
        db: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, date_joined
            FROM users
            WHERE username = $1 OR email = LOWER($1)
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await
    }

    /// Find any user holding either the username or the email, used to
    /// reject a registration before hashing the password.
    pub async fn find_by_username_or_email(
        db: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, date_joined
            FROM users
            WHERE username = $1 OR email = $2
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with a hashed password. A duplicate username or
    /// email fails the unique constraint; nothing is written in that case.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, date_joined
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn mixed_case_email_identifier_still_finds_the_user(db: PgPool) {
        let created = User::create(&db, "sam", "sam@example.com", "not-a-real-hash")
            .await
            .unwrap();

        let by_email = User::find_by_identifier(&db, "Sam@Example.com")
            .await
            .unwrap()
            .expect("lookup by mixed-case email");
        assert_eq!(by_email.id, created.id);

        let by_username = User::find_by_identifier(&db, "sam")
            .await
            .unwrap()
            .expect("lookup by username");
        assert_eq!(by_username.id, created.id);

        // Usernames keep their case.
        assert!(User::find_by_identifier(&db, "SAM").await.unwrap().is_none());
    }
}
