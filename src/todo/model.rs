use crate::schema::{Field, FieldType, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "todos";
pub const TITLE_MAX_LEN: u32 = 200;

/// A todo item. `deleted_at` is the soft-delete marker and never leaves the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Body of `POST /todos`. Unknown keys are ignored; `completed` defaults to false in the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn titled(title: &str) -> Self {
        NewTodo {
            title: Some(title.to_string()),
            completed: None,
        }
    }
}

/// Body of `PUT /todos/:id`. Only the fields that are set get written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

pub fn todo_schema() -> Schema {
    Schema {
        name: MODEL_NAME.into(),
        display_name: "Todos".into(),
        fields: vec![
            Field::new("id", FieldType::Number, "ID").readonly(),
            Field::new("title", FieldType::String, "Title")
                .required()
                .max_length(TITLE_MAX_LEN),
            Field::new("completed", FieldType::Boolean, "Completed"),
            Field::new("created_at", FieldType::Date, "Created").readonly(),
            Field::new("updated_at", FieldType::Date, "Updated").readonly(),
        ],
        filterable: vec!["completed".into()],
        searchable: vec!["title".into()],
    }
}
