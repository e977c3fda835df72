use super::model::{NewTodo, Todo, TodoPatch, MODEL_NAME};
use super::TodoModule;
use crate::error::AppError;
use crate::provider::{parse_id, to_column_map, CrudProvider, ListPage, ListQuery};
use crate::schema::Schema;
use crate::service::{CrudService, RequestValidator};
use async_trait::async_trait;

#[async_trait]
impl CrudProvider for TodoModule {
    type Entity = Todo;
    type Create = NewTodo;
    type Patch = TodoPatch;

    fn model_name(&self) -> &'static str {
        MODEL_NAME
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    async fn list(&self, query: ListQuery) -> Result<ListPage<Todo>, AppError> {
        CrudService::list(&self.pool, &self.entity, &query).await
    }

    async fn get(&self, id: &str) -> Result<Todo, AppError> {
        let id_value = parse_id(id, &self.entity.pk_type)?;
        CrudService::read(&self.pool, &self.entity, &id_value)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("todo {}", id)))
    }

    async fn create(&self, input: NewTodo) -> Result<Todo, AppError> {
        let body = to_column_map(&input)?;
        RequestValidator::validate(&body, &self.schema)?;
        let todo: Todo = CrudService::create(&self.pool, &self.entity, &body).await?;
        tracing::debug!(id = todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> Result<Todo, AppError> {
        let id_value = parse_id(id, &self.entity.pk_type)?;
        let body = to_column_map(&patch)?;
        RequestValidator::validate_partial(&body, &self.schema)?;
        CrudService::update(&self.pool, &self.entity, &id_value, &body)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("todo {}", id)))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id_value = parse_id(id, &self.entity.pk_type)?;
        if !CrudService::delete(&self.pool, &self.entity, &id_value).await? {
            return Err(AppError::NotFound(format!("todo {}", id)));
        }
        tracing::debug!(id = %id, "todo soft-deleted");
        Ok(())
    }
}
