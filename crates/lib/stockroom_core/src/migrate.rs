//! Embedded schema migrations from `stockroom_core/migrations/`.

use sqlx::PgPool;
use tracing::info;

/// Apply every pending migration.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database schema up to date");
    Ok(())
}
