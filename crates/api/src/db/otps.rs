//! One-time passcode repository.
//!
//! Two tables back the passwordless flow: `store.otps` holds at most one
//! active code per email (hashed, with attempt count and expiry), and
//! `store.otp_requests` is an append-only log of send requests used for
//! the rolling rate limit.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use meridian_core::Email;

use super::RepositoryError;
use crate::models::OtpRecord;

const OTP_COLUMNS: &str = "email, code_hash, attempts, expires_at, created_at";

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct OtpRow {
    email: String,
    code_hash: String,
    attempts: i32,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = RepositoryError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            email,
            code_hash: row.code_hash,
            attempts: row.attempts,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

/// Repository for one-time passcode database operations.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count send requests for this email inside the rolling window.
    ///
    /// Entries older than the window are pruned opportunistically so the
    /// log doesn't grow without bound.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent_request_count(
        &self,
        email: &Email,
        window: Duration,
    ) -> Result<i64, RepositoryError> {
        let cutoff = Utc::now() - window;

        sqlx::query("DELETE FROM store.otp_requests WHERE requested_at < $1")
            .bind(cutoff)
            .execute(self.pool)
            .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM store.otp_requests WHERE email = $1 AND requested_at >= $2",
        )
        .bind(email.as_ref())
        .bind(cutoff)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Append a send request to the rate-limit log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_request(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO store.otp_requests (email) VALUES ($1)")
            .bind(email.as_ref())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Replace any active code for this email with a fresh one, resetting
    /// the attempt count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn replace(
        &self,
        email: &Email,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO store.otps (email, code_hash, attempts, expires_at) \
             VALUES ($1, $2, 0, $3) \
             ON CONFLICT (email) DO UPDATE SET \
                 code_hash = EXCLUDED.code_hash, \
                 attempts = 0, \
                 expires_at = EXCLUDED.expires_at, \
                 created_at = now()",
        )
        .bind(email.as_ref())
        .bind(code_hash)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get the active code record for an email, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<OtpRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(&format!(
            "SELECT {OTP_COLUMNS} FROM store.otps WHERE email = $1"
        ))
        .bind(email.as_ref())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete the active code for an email. Codes are single-use, so this
    /// runs on successful verification as well as on expiry and lock-out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM store.otps WHERE email = $1")
            .bind(email.as_ref())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Record a failed verification attempt, returning the new attempt count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    /// Returns `RepositoryError::NotFound` if no code exists for this email.
    pub async fn increment_attempts(&self, email: &Email) -> Result<i32, RepositoryError> {
        let attempts: Option<i32> = sqlx::query_scalar(
            "UPDATE store.otps SET attempts = attempts + 1 WHERE email = $1 RETURNING attempts",
        )
        .bind(email.as_ref())
        .fetch_optional(self.pool)
        .await?;

        attempts.ok_or(RepositoryError::NotFound)
    }
}
