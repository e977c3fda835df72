//! The todos resource: a soft-deletable table served through the default CRUD operations.

mod crud;
pub mod model;

pub use model::{todo_schema, NewTodo, Todo, TodoPatch};

use crate::error::AppError;
use crate::migration::ensure_table;
use crate::module::Module;
use crate::routes::crud_routes;
use crate::schema::{resolve, ResolvedEntity, Schema, TableBinding};
use crate::sql::qualified_table;
use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct TodoModule {
    pool: PgPool,
    schema: Schema,
    entity: ResolvedEntity,
}

impl TodoModule {
    /// Todos in `public.todos`.
    pub fn new(pool: PgPool) -> Result<Self, AppError> {
        Self::with_binding(pool, TableBinding::public(model::MODEL_NAME))
    }

    /// Todos in a caller-chosen table, e.g. an isolated schema for tests.
    pub fn with_binding(pool: PgPool, binding: TableBinding) -> Result<Self, AppError> {
        let schema = todo_schema();
        let entity = resolve(&schema, binding)?;
        Ok(TodoModule { pool, schema, entity })
    }
}

#[async_trait]
impl Module for TodoModule {
    fn name(&self) -> &'static str {
        model::MODEL_NAME
    }

    fn routes(&self) -> Router {
        crud_routes(Arc::new(self.clone()))
    }

    async fn migrate(&self, pool: &PgPool) -> Result<(), AppError> {
        ensure_table(pool, &self.entity).await
    }

    async fn ready(&self, pool: &PgPool) -> Result<(), AppError> {
        let table = qualified_table(&self.entity);
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(&table)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("table {}", table)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Only requests rejected before the store is touched are sent, so the pool never connects.
    fn app() -> Router {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/todos")
            .unwrap();
        TodoModule::new(pool).unwrap().routes()
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn schema_route_serves_todos_descriptor() {
        let (status, body) = send(&app(), "GET", "/todos/schema", None).await;
        assert_eq!(status, StatusCode::OK);
        let schema = &body["data"];
        assert_eq!(schema["name"], "todos");
        assert_eq!(schema["display_name"], "Todos");
        assert_eq!(schema["filterable"], json!(["completed"]));
        assert_eq!(schema["searchable"], json!(["title"]));
        let title = &schema["fields"][1];
        assert_eq!(title["name"], "title");
        assert_eq!(title["type"], "string");
        assert_eq!(title["required"], true);
        assert_eq!(title["max_length"], 200);
        assert_eq!(schema["fields"][0]["readonly"], true);
    }

    #[tokio::test]
    async fn title_of_wrong_type_is_a_validation_error() {
        let (status, body) = send(&app(), "PUT", "/todos/1", Some(json!({"title": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["title"], "Title must be a string");
    }

    #[tokio::test]
    async fn create_without_title_is_rejected() {
        let (status, body) = send(&app(), "POST", "/todos", Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["title"], "Title is required");
    }

    #[tokio::test]
    async fn non_numeric_id_is_invalid_argument() {
        let app = app();
        for (method, body) in [("GET", None), ("PUT", Some(json!({"completed": true}))), ("DELETE", None)] {
            let (status, resp) = send(&app, method, "/todos/abc", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(resp["error"]["code"], "invalid_argument");
        }
    }
}
