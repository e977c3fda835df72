//! Bring a resolved entity's table into existence: schema, table, and list index.
//! Idempotent: everything is IF NOT EXISTS.

use crate::error::AppError;
use crate::schema::{PkType, ResolvedEntity};
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// DDL statements for `entity`, in execution order.
pub fn table_ddl(entity: &ResolvedEntity) -> Vec<String> {
    let table = qualified_table(entity);
    let mut col_defs: Vec<String> = Vec::with_capacity(entity.columns.len());
    for c in &entity.columns {
        let def = match c.pk_type {
            Some(PkType::BigInt) => format!("{} BIGSERIAL PRIMARY KEY", quoted(&c.name)),
            Some(PkType::Int) => format!("{} SERIAL PRIMARY KEY", quoted(&c.name)),
            Some(_) => {
                let mut def = format!("{} {} PRIMARY KEY", quoted(&c.name), c.pg_type.to_uppercase());
                if let Some(d) = &c.default_expr {
                    def.push_str(" DEFAULT ");
                    def.push_str(d);
                }
                def
            }
            None => {
                let mut def = format!("{} {}", quoted(&c.name), c.pg_type.to_uppercase());
                if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                if let Some(d) = &c.default_expr {
                    def.push_str(" DEFAULT ");
                    def.push_str(d);
                }
                def
            }
        };
        col_defs.push(def);
    }

    let mut stmts = vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&entity.schema_name)),
        format!("CREATE TABLE IF NOT EXISTS {} (\n  {}\n)", table, col_defs.join(",\n  ")),
    ];

    let index_name = quoted(&format!("idx_{}_{}", entity.table_name, entity.order_column()));
    let index_cols = format!("{} DESC", quoted(entity.order_column()));
    stmts.push(match &entity.soft_delete_column {
        Some(deleted_at) => format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({}) WHERE {} IS NULL",
            index_name,
            table,
            index_cols,
            quoted(deleted_at)
        ),
        None => format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", index_name, table, index_cols),
    });
    stmts
}

pub async fn ensure_table(pool: &PgPool, entity: &ResolvedEntity) -> Result<(), AppError> {
    for sql in table_ddl(entity) {
        tracing::debug!(sql = %sql, "migrate");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(
        schema = %entity.schema_name,
        table = %entity.table_name,
        "table ready"
    );
    Ok(())
}
