//! HTTP server: loads settings, ensures the database, migrates registered modules,
//! mounts common routes and module routes under the API prefix.
//!
//! Run: `cargo run --bin todo-server`

use axum::Router;
use tokio::net::TcpListener;
use todo_crud::{common_routes, connect, AppState, ModuleRegistry, Settings, TodoModule};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("todo_crud=info,todo_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = connect(&settings).await?;

    let mut registry = ModuleRegistry::new();
    registry.register(TodoModule::new(pool.clone())?)?;
    registry.migrate_all(&pool).await?;

    let modules = if settings.api_prefix.is_empty() {
        registry.router()
    } else {
        Router::new().nest(&settings.api_prefix, registry.router())
    };
    let app = Router::new()
        .merge(common_routes(AppState {
            pool,
            modules: registry.clone(),
        }))
        .merge(modules)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(modules = ?registry.names(), "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
