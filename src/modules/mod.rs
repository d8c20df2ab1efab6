pub mod books;

use libris_kernel::ModuleRegistry;
use sqlx::PgPool;

/// Register every application module with the registry.
pub fn register_all(registry: &mut ModuleRegistry, pool: PgPool) {
    registry.register(books::create_module(pool));
}
