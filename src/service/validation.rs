//! Request validation from schema field rules.

use crate::error::{AppError, ValidationErrors};
use crate::schema::{Field, FieldType, Schema};
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. Every required writable field must be present and non-blank.
    pub fn validate(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        for field in schema.fields.iter().filter(|f| f.writable()) {
            match body.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    errors.add(&field.name, format!("{} is required", field.label));
                }
                Some(v) => validate_field(field, v, &mut errors),
                None => {}
            }
        }
        errors.into_result()
    }

    /// Validate only the fields present in body (partial update). Absent fields are not required.
    pub fn validate_partial(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        for (name, v) in body {
            if let Some(field) = schema.field(name).filter(|f| f.writable()) {
                validate_field(field, v, &mut errors);
            }
        }
        errors.into_result()
    }

    /// Type check only, for raw request bodies before they are decoded into typed input.
    pub fn check_types(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        for (name, v) in body {
            if let Some(field) = schema.field(name).filter(|f| f.writable()) {
                if let Some(message) = type_error(field, v) {
                    errors.add(&field.name, message);
                }
            }
        }
        errors.into_result()
    }
}

fn type_error(field: &Field, v: &Value) -> Option<String> {
    let type_ok = match field.field_type {
        _ if v.is_null() => true,
        FieldType::String | FieldType::Date => v.is_string(),
        FieldType::Number => v.is_number(),
        FieldType::Boolean => v.is_boolean(),
    };
    (!type_ok).then(|| format!("{} must be a {}", field.label, field.field_type.as_str()))
}

fn validate_field(field: &Field, v: &Value, errors: &mut ValidationErrors) {
    if v.is_null() {
        if field.required {
            errors.add(&field.name, format!("{} is required", field.label));
        }
        return;
    }
    if let Some(message) = type_error(field, v) {
        errors.add(&field.name, message);
        return;
    }
    if let Some(s) = v.as_str() {
        if field.required && s.trim().is_empty() {
            errors.add(&field.name, format!("{} is required", field.label));
        }
        if let Some(max) = field.max_length {
            if s.chars().count() > max as usize {
                errors.add(
                    &field.name,
                    format!("{} must be at most {} characters", field.label, max),
                );
            }
        }
    }
}
