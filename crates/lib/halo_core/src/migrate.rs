//! Schema migrations for the staff, patient, and medical record tables.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::info;

/// Migrations embedded from `halo_core/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the schema up to date.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    info!(embedded = MIGRATOR.iter().count(), "applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("schema up to date");
    Ok(())
}
