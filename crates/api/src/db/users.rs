//! User repository for account database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use meridian_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, last_login, created_at, updated_at";

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    last_login: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the user on first sign-in, or refresh name and last-login on
    /// a returning one. Runs as a single upsert so concurrent verifications
    /// of the same address can't race into duplicate accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_login(&self, email: &Email, name: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO store.users (email, name, last_login) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (email) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 last_login = now(), \
                 updated_at = now() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_ref())
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(email: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Test User".to_string(),
            last_login: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_user() {
        let last_login = Utc::now();
        let mut raw = row("user@example.com");
        raw.last_login = last_login;

        let user = User::try_from(raw).unwrap();
        assert_eq!(user.email.as_ref(), "user@example.com");
        assert_eq!(user.last_login, last_login);
    }

    #[test]
    fn test_row_with_invalid_email_is_corruption() {
        let result = User::try_from(row("not-an-email"));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
