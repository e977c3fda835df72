//! Resolved entity: a schema bound to a concrete table, flattened for the SQL builder.

use crate::error::SchemaError;
use crate::schema::{validate, FieldType, Schema};
use serde_json::Value;

/// Primary key type for parsing path ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkType {
    Uuid,
    BigInt,
    Int,
    Text,
}

impl PkType {
    fn pg_type(&self) -> &'static str {
        match self {
            PkType::Uuid => "uuid",
            PkType::BigInt => "bigint",
            PkType::Int => "integer",
            PkType::Text => "text",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub pk_type: Option<PkType>,
    pub nullable: bool,
    /// SQL default expression used when creating the table.
    pub default_expr: Option<String>,
    /// PostgreSQL type name, used for DDL and for parameter casts.
    pub pg_type: String,
    /// Accepts values from request input on insert/update.
    pub writable: bool,
}

/// Where a schema lives in the database.
#[derive(Clone, Debug)]
pub struct TableBinding {
    pub schema_name: String,
    pub table_name: String,
    pub pk_column: String,
    pub pk_type: PkType,
    /// Adds a nullable `deleted_at` column; reads skip rows where it is set.
    pub soft_delete: bool,
}

impl TableBinding {
    /// `public.<table>` keyed by `id BIGSERIAL`, with soft delete.
    pub fn public(table_name: &str) -> Self {
        TableBinding {
            schema_name: "public".into(),
            table_name: table_name.into(),
            pk_column: "id".into(),
            pk_type: PkType::BigInt,
            soft_delete: true,
        }
    }
}

pub const DELETED_AT: &str = "deleted_at";
const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub schema_name: String,
    pub table_name: String,
    pub pk_column: String,
    pub pk_type: PkType,
    pub columns: Vec<ColumnInfo>,
    pub filterable: Vec<String>,
    pub searchable: Vec<String>,
    pub soft_delete_column: Option<String>,
    pub created_at_column: Option<String>,
    pub updated_at_column: Option<String>,
}

impl ResolvedEntity {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Newest first when the table tracks creation time, otherwise by primary key.
    pub fn order_column(&self) -> &str {
        self.created_at_column.as_deref().unwrap_or(&self.pk_column)
    }

    /// Turns raw query-string filters into typed equality filters.
    /// Keys outside the filterable allowlist are dropped.
    pub fn typed_filters<'a, I>(&self, raw: I) -> Vec<(String, Value)>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut out: Vec<(String, Value)> = raw
            .into_iter()
            .filter(|(k, _)| self.filterable.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), self.coerce_filter_value(k, v)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn coerce_filter_value(&self, col: &str, s: &str) -> Value {
        let pg_type = self.column(col).map(|c| c.pg_type.as_str()).unwrap_or("");
        if pg_type.starts_with("bool") {
            return Value::Bool(s.eq_ignore_ascii_case("true"));
        }
        if pg_type.contains("int") {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
        }
        Value::String(s.to_string())
    }
}

/// Bind a schema to a table. Validates the schema first.
pub fn resolve(schema: &Schema, binding: TableBinding) -> Result<ResolvedEntity, SchemaError> {
    validate(schema)?;
    if schema.field(&binding.pk_column).is_none() {
        return Err(SchemaError::MissingPrimaryKey(binding.pk_column.clone()));
    }

    let mut columns = Vec::with_capacity(schema.fields.len() + 1);
    for f in &schema.fields {
        let is_pk = f.name == binding.pk_column;
        let column = if is_pk {
            ColumnInfo {
                name: f.name.clone(),
                pk_type: Some(binding.pk_type),
                nullable: false,
                default_expr: match binding.pk_type {
                    PkType::Uuid => Some("gen_random_uuid()".into()),
                    _ => None,
                },
                pg_type: binding.pk_type.pg_type().into(),
                writable: binding.pk_type == PkType::Text,
            }
        } else {
            let default_expr = match f.field_type {
                FieldType::Date if f.name == CREATED_AT || f.name == UPDATED_AT => Some("NOW()".to_string()),
                FieldType::Boolean if !f.required => Some("FALSE".to_string()),
                _ => None,
            };
            let pg_type = match (f.field_type, f.max_length) {
                (FieldType::String, Some(n)) => format!("varchar({})", n),
                (FieldType::String, None) => "text".into(),
                (FieldType::Number, _) => "bigint".into(),
                (FieldType::Boolean, _) => "boolean".into(),
                (FieldType::Date, _) => "timestamptz".into(),
            };
            ColumnInfo {
                name: f.name.clone(),
                pk_type: None,
                nullable: !f.required && default_expr.is_none(),
                default_expr,
                pg_type,
                writable: f.writable(),
            }
        };
        columns.push(column);
    }

    let soft_delete_column = if binding.soft_delete {
        columns.push(ColumnInfo {
            name: DELETED_AT.into(),
            pk_type: None,
            nullable: true,
            default_expr: None,
            pg_type: "timestamptz".into(),
            writable: false,
        });
        Some(DELETED_AT.to_string())
    } else {
        None
    };

    let timestamp_column = |name: &str| {
        schema
            .field(name)
            .filter(|f| f.field_type == FieldType::Date)
            .map(|f| f.name.clone())
    };

    Ok(ResolvedEntity {
        schema_name: binding.schema_name,
        table_name: binding.table_name,
        pk_column: binding.pk_column,
        pk_type: binding.pk_type,
        columns,
        filterable: schema.filterable.clone(),
        searchable: schema.searchable.clone(),
        soft_delete_column,
        created_at_column: timestamp_column(CREATED_AT),
        updated_at_column: timestamp_column(UPDATED_AT),
    })
}
