//! Shared state for the service routes. Resource modules carry their own handles.

use crate::module::ModuleRegistry;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub modules: ModuleRegistry,
}
