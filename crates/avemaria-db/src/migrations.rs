//! Embedded schema migrations.
//!
//! `sqlx::migrate!` compiles every file under `migrations/sqlite/` into the
//! binary, so a deployment is just the executable plus its database file.
//! Applied versions are tracked in `_sqlx_migrations`; migrations run in
//! filename order (`001_...`, `002_...`) and existing files are never
//! edited after they ship, only followed by new ones.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the schema up to date. Safe to call on every startup; already
/// applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// (embedded, applied) migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
