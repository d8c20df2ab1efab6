//! PostgreSQL access for libris: connection pool construction from settings
//! and the startup migration runner. Per-entity queries live with the
//! modules that own the entity; this crate only hands out the pool.

use anyhow::{bail, Context};
use libris_kernel::settings::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

pub mod error;
pub mod migrate;

pub use error::DbError;

/// Build a connection pool from settings. Failure here is fatal to the
/// process; callers bail out with context instead of retrying.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.dbname)
        .ssl_mode(ssl_mode(&settings.sslmode)?);

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        dbname = %settings.dbname,
        "connecting to postgres"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "failed to connect to postgres at {}:{}/{}",
                settings.host, settings.port, settings.dbname
            )
        })?;

    Ok(pool)
}

fn ssl_mode(raw: &str) -> anyhow::Result<PgSslMode> {
    let mode = match raw {
        "disable" => PgSslMode::Disable,
        "allow" => PgSslMode::Allow,
        "prefer" => PgSslMode::Prefer,
        "require" => PgSslMode::Require,
        "verify-ca" => PgSslMode::VerifyCa,
        "verify-full" => PgSslMode::VerifyFull,
        other => bail!("unsupported sslmode '{other}'"),
    };

    Ok(mode)
}
