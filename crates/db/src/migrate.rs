use anyhow::Context;
use libris_kernel::Migration;
use sqlx::PgPool;

/// Execute module migrations in the order the registry collected them.
/// Scripts are expected to be idempotent (`CREATE TABLE IF NOT EXISTS` and
/// friends), so the runner keeps no applied-migrations bookkeeping.
pub async fn run(pool: &PgPool, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
    tracing::info!("running {} migrations", migrations.len());

    for (module, migration) in migrations {
        tracing::info!(module = %module, id = migration.id, "applying migration");

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;
    }

    Ok(())
}
