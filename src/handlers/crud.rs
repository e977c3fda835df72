//! Resource CRUD handlers: list, schema, read, create, update, delete.
//! Translation only: parse the request, call the provider verb, wrap the result.

use crate::error::AppError;
use crate::provider::{CrudProvider, ListQuery};
use crate::response::{success_one, success_one_ok, success_page};
use crate::schema::Schema;
use crate::service::RequestValidator;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Wrong-typed schema fields become validation errors; anything else that fails to decode is a bad request.
fn body_to_input<T: DeserializeOwned>(value: Value, schema: &Schema) -> Result<T, AppError> {
    let Value::Object(map) = &value else {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    };
    RequestValidator::check_types(map, schema)?;
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(format!("invalid request body: {}", e)))
}

pub async fn list<P: CrudProvider>(
    State(provider): State<Arc<P>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::from_params(params);
    let page = provider.list(query).await?;
    Ok(success_page(page))
}

pub async fn schema<P: CrudProvider>(State(provider): State<Arc<P>>) -> impl IntoResponse {
    success_one_ok(provider.schema())
}

pub async fn read<P: CrudProvider>(
    State(provider): State<Arc<P>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = provider.get(&id).await?;
    Ok(success_one_ok(row))
}

pub async fn create<P: CrudProvider>(
    State(provider): State<Arc<P>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input = body_to_input::<P::Create>(body, &provider.schema())?;
    let row = provider.create(input).await?;
    Ok(success_one(row))
}

pub async fn update<P: CrudProvider>(
    State(provider): State<Arc<P>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let patch = body_to_input::<P::Patch>(body, &provider.schema())?;
    let row = provider.update(&id, patch).await?;
    Ok(success_one_ok(row))
}

pub async fn delete<P: CrudProvider>(
    State(provider): State<Arc<P>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    provider.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
