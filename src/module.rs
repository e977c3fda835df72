//! Pluggable modules: each contributes a name, a router, and a migration.

use crate::error::AppError;
use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    /// Routes relative to the API prefix.
    fn routes(&self) -> Router;

    /// Make the store match this module's entities. Must be idempotent.
    async fn migrate(&self, pool: &PgPool) -> Result<(), AppError>;

    /// Whether the module can serve requests. Modules without store state are always ready.
    async fn ready(&self, _pool: &PgPool) -> Result<(), AppError> {
        Ok(())
    }
}

/// Ordered set of modules with unique names.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Module + 'static>(&mut self, module: M) -> Result<(), AppError> {
        let name = module.name();
        if self.modules.iter().any(|m| m.name() == name) {
            return Err(AppError::Conflict(format!("module '{}' already registered", name)));
        }
        tracing::info!(module = name, "module registered");
        self.modules.push(Arc::new(module));
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Run every module's migration in registration order; stops at the first failure.
    pub async fn migrate_all(&self, pool: &PgPool) -> Result<(), AppError> {
        for m in &self.modules {
            tracing::info!(module = m.name(), "migrating");
            m.migrate(pool).await?;
        }
        Ok(())
    }

    /// Readiness of every module, in registration order.
    pub async fn check_ready(&self, pool: &PgPool) -> Vec<(&'static str, Result<(), AppError>)> {
        let mut out = Vec::with_capacity(self.modules.len());
        for m in &self.modules {
            out.push((m.name(), m.ready(pool).await));
        }
        out
    }

    /// All module routers merged into one.
    pub fn router(&self) -> Router {
        self.modules
            .iter()
            .fold(Router::new(), |router, m| router.merge(m.routes()))
    }
}
