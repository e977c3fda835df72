//! Schema descriptor types served by `GET /{model}/schema`.

use serde::{Deserialize, Serialize};

/// Semantic type of a field, as understood by clients rendering forms and tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl Field {
    /// Editable, optional field.
    pub fn new(name: &str, field_type: FieldType, label: &str) -> Self {
        Field {
            name: name.to_string(),
            field_type,
            label: label.to_string(),
            required: false,
            readonly: false,
            editable: true,
            max_length: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Server-managed: never written from request input.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self.editable = false;
        self
    }

    pub fn max_length(mut self, max: u32) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Whether clients may supply this field on create or update.
    pub fn writable(&self) -> bool {
        self.editable && !self.readonly
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub display_name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub filterable: Vec<String>,
    #[serde(default)]
    pub searchable: Vec<String>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
