//! Database migration command.
//!
//! Applies the migrations embedded from `crates/api/migrations/`.

use sqlx::PgPool;

use super::CommandError;

/// Run pending database migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
