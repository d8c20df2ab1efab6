use anyhow::Context;
use libris_kernel::settings::Settings;
use libris_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load libris settings")?;

    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db_host = %settings.database.host,
        "libris bootstrap starting"
    );

    // A database we cannot reach is the one startup error that kills the
    // process.
    let pool = libris_db::connect(&settings.database)
        .await
        .with_context(|| "failed to establish initial database connection")?;

    let mut registry = ModuleRegistry::new();
    libris_app::modules::register_all(&mut registry, pool.clone());

    libris_db::migrate::run(&pool, &registry.collect_migrations()).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    libris_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;
    pool.close().await;

    tracing::info!("libris shutdown complete");
    Ok(())
}
