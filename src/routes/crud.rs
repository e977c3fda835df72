//! CRUD routes for one provider, mounted under its model name.

use crate::handlers::crud::{create, delete as delete_handler, list, read, schema, update};
use crate::provider::CrudProvider;
use axum::{routing::get, Router};
use std::sync::Arc;

/// `GET/POST /{model}`, `GET /{model}/schema`, `GET/PUT/DELETE /{model}/:id`.
pub fn crud_routes<P: CrudProvider>(provider: Arc<P>) -> Router {
    let base = format!("/{}", provider.model_name());
    Router::new()
        .route(&base, get(list::<P>).post(create::<P>))
        .route(&format!("{}/schema", base), get(schema::<P>))
        .route(
            &format!("{}/:id", base),
            get(read::<P>).put(update::<P>).delete(delete_handler::<P>),
        )
        .with_state(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::provider::{parse_id, ListPage, ListQuery};
    use crate::schema::{Field, FieldType, PkType, Schema};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug, Serialize)]
    struct Note {
        id: i64,
        body: String,
        pinned: bool,
    }

    #[derive(Deserialize)]
    struct NewNote {
        body: Option<String>,
        pinned: Option<bool>,
    }

    #[derive(Deserialize)]
    struct NotePatch {
        body: Option<String>,
        pinned: Option<bool>,
    }

    /// In-memory provider: exercises the HTTP translation, not the store.
    #[derive(Default)]
    struct MemoryNotes {
        rows: Mutex<Vec<Note>>,
    }

    impl MemoryNotes {
        fn id(&self, id: &str) -> Result<i64, AppError> {
            Ok(parse_id(id, &PkType::BigInt)?.as_i64().unwrap_or_default())
        }
    }

    #[async_trait]
    impl CrudProvider for MemoryNotes {
        type Entity = Note;
        type Create = NewNote;
        type Patch = NotePatch;

        fn model_name(&self) -> &'static str {
            "notes"
        }

        fn schema(&self) -> Schema {
            Schema {
                name: "notes".into(),
                display_name: "Notes".into(),
                fields: vec![
                    Field::new("id", FieldType::Number, "ID").readonly(),
                    Field::new("body", FieldType::String, "Body").required(),
                    Field::new("pinned", FieldType::Boolean, "Pinned"),
                ],
                filterable: vec!["pinned".into()],
                searchable: vec!["body".into()],
            }
        }

        async fn list(&self, query: ListQuery) -> Result<ListPage<Note>, AppError> {
            let rows = self.rows.lock().unwrap().clone();
            let total = rows.len() as u64;
            let items = rows
                .into_iter()
                .skip(query.offset() as usize)
                .take(query.limit as usize)
                .collect();
            Ok(ListPage {
                items,
                total,
                page: query.page,
                limit: query.limit,
            })
        }

        async fn get(&self, id: &str) -> Result<Note, AppError> {
            let id = self.id(id)?;
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("note {}", id)))
        }

        async fn create(&self, input: NewNote) -> Result<Note, AppError> {
            let body = input.body.filter(|b| !b.trim().is_empty()).ok_or_else(|| AppError::field("body", "Body is required"))?;
            let mut rows = self.rows.lock().unwrap();
            let note = Note {
                id: rows.len() as i64 + 1,
                body,
                pinned: input.pinned.unwrap_or(false),
            };
            rows.push(note.clone());
            Ok(note)
        }

        async fn update(&self, id: &str, patch: NotePatch) -> Result<Note, AppError> {
            let id = self.id(id)?;
            let mut rows = self.rows.lock().unwrap();
            let note = rows
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| AppError::NotFound(format!("note {}", id)))?;
            if let Some(body) = patch.body {
                note.body = body;
            }
            if let Some(pinned) = patch.pinned {
                note.pinned = pinned;
            }
            Ok(note.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), AppError> {
            let id = self.id(id)?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|n| n.id != id);
            if rows.len() == before {
                return Err(AppError::NotFound(format!("note {}", id)));
            }
            Ok(())
        }
    }

    fn app() -> Router {
        crud_routes(Arc::new(MemoryNotes::default()))
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
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_returns_201_with_envelope() {
        let app = app();
        let (status, body) = send(&app, "POST", "/notes", Some(json!({"body": "Buy milk", "color": "red"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"], json!({"id": 1, "body": "Buy milk", "pinned": false}));
    }

    #[tokio::test]
    async fn validation_error_maps_to_400_with_details() {
        let app = app();
        let (status, body) = send(&app, "POST", "/notes", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["body"], "Body is required");
    }

    #[tokio::test]
    async fn non_object_body_is_bad_request() {
        let app = app();
        let (status, body) = send(&app, "POST", "/notes", Some(json!(["x"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_validation_error() {
        let app = app();
        let (status, body) = send(&app, "POST", "/notes", Some(json!({"body": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["body"], "Body must be a string");

        send(&app, "POST", "/notes", Some(json!({"body": "first"}))).await;
        let (status, body) = send(&app, "PUT", "/notes/1", Some(json!({"pinned": "yes"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["pinned"], "Pinned must be a boolean");
    }

    #[tokio::test]
    async fn read_update_delete_lifecycle() {
        let app = app();
        send(&app, "POST", "/notes", Some(json!({"body": "first"}))).await;

        let (status, body) = send(&app, "GET", "/notes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["body"], "first");

        let (status, body) = send(&app, "PUT", "/notes/1", Some(json!({"pinned": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"id": 1, "body": "first", "pinned": true}));

        let (status, body) = send(&app, "DELETE", "/notes/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, "GET", "/notes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, _) = send(&app, "DELETE", "/notes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_invalid_argument() {
        let app = app();
        for (method, body) in [("GET", None), ("PUT", Some(json!({"pinned": true}))), ("DELETE", None)] {
            let (status, resp) = send(&app, method, "/notes/abc", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(resp["error"]["code"], "invalid_argument");
        }
    }

    #[tokio::test]
    async fn list_reports_page_meta() {
        let app = app();
        for i in 0..15 {
            send(&app, "POST", "/notes", Some(json!({"body": format!("note {}", i)}))).await;
        }
        let (status, body) = send(&app, "GET", "/notes?page=2&limit=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["meta"], json!({"total": 15, "page": 2, "limit": 10}));
    }

    #[tokio::test]
    async fn schema_route_wins_over_id_route() {
        let app = app();
        let (status, body) = send(&app, "GET", "/notes/schema", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "notes");
        assert_eq!(body["data"]["fields"][1]["type"], "string");
        assert_eq!(body["data"]["filterable"], json!(["pinned"]));
    }
}
