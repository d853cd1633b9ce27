//! Database connection management

use sqlx::{PgPool, migrate::MigrateError};
use tracing::info;

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply the migrations under `migrations/`.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;

    info!("database migrations applied");

    Ok(())
}
