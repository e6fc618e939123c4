//! # Migrations
//!
//! Schema files from `migrations/sqlite` are embedded at compile time and
//! applied in filename order. Applied versions are tracked in
//! `_sqlx_migrations`, so running them again is a no-op.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(available = MIGRATOR.migrations.len(), "Applying pending migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), usize::try_from(applied).unwrap_or(0)))
}
