use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization and startup.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Schema migration contributed by a module. Scripts must be idempotent;
/// the runner re-executes them on every boot.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Core trait every libris module implements.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module.
    fn name(&self) -> &'static str;

    /// Called during application startup, after migrations have run.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Axum router carrying this module's routes. Paths are absolute;
    /// the HTTP facade merges them into the application router.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment for this module, merged with the fragments of
    /// every other module into the served document.
    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        None
    }

    /// Migrations contributed by this module, executed in declaration order.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Start background tasks. Called after every module is initialized.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources during shutdown.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
