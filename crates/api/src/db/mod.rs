//! Database operations for the Meridian `PostgreSQL` database.
//!
//! # Schema: `store`
//!
//! ## Tables
//!
//! - `store.users` - Accounts created through OTP verification
//! - `store.otps` - Live one-time passcodes (hash only), at most one per email
//! - `store.otp_requests` - Append-only OTP issuance log for rate limiting
//! - `store.products` - Catalog
//! - `store.carts` / `store.cart_items` - Per-user carts
//! - `store.orders` / `store.order_items` - Immutable order snapshots
//! - `store.order_counter` - Atomic sequence for order numbers
//!
//! # Conventions
//!
//! Each entity has a repository struct borrowing the pool. Queries use the
//! runtime sqlx API with `FromRow` row structs; rows convert into domain
//! types via `TryFrom`, mapping invalid stored data to
//! [`RepositoryError::DataCorruption`].
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p meridian-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod otps;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool without establishing a connection up front.
///
/// Used by the integration tests, which exercise request validation paths
/// that never reach the database.
#[must_use]
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> PgPool {
    PgPoolOptions::new()
        .max_connections(2)
        .connect_lazy(database_url.expose_secret())
        .unwrap_or_else(|_| {
            // connect_lazy only fails on an unparseable URL
            PgPoolOptions::new()
                .connect_lazy("postgres://localhost/meridian")
                .expect("static fallback URL is valid")
        })
}
