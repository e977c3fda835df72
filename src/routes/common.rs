//! Service routes: liveness, readiness of the database and every registered module, build info.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct ModuleStatus {
    name: &'static str,
    ready: bool,
}

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    database: &'static str,
    modules: Vec<ModuleStatus>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// 200 only when the database answers and every module reports ready.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    if let Err(e) = sqlx::query("SELECT 1").execute(&state.pool).await {
        tracing::warn!(error = %e, "database unreachable");
        let modules = state
            .modules
            .names()
            .into_iter()
            .map(|name| ModuleStatus { name, ready: false })
            .collect();
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Readiness {
                status: "unavailable",
                database: "unavailable",
                modules,
            }),
        );
    }

    let mut all_ready = true;
    let mut modules = Vec::new();
    for (name, result) in state.modules.check_ready(&state.pool).await {
        if let Err(e) = &result {
            tracing::warn!(module = name, error = %e, "module not ready");
            all_ready = false;
        }
        modules.push(ModuleStatus {
            name,
            ready: result.is_ok(),
        });
    }
    let (code, status) = if all_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        code,
        Json(Readiness {
            status,
            database: "ok",
            modules,
        }),
    )
}

async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "modules": state.modules.names(),
    }))
}

/// `GET /health`, `GET /ready`, `GET /version`.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
