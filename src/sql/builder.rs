//! Builds parameterized SELECT, COUNT, INSERT, UPDATE and soft DELETE from a resolved entity.
//! Every read and write path excludes soft-deleted rows explicitly.

use crate::schema::ResolvedEntity;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from schema descriptors).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quoted(&entity.schema_name), quoted(&entity.table_name))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Pushes `v` and returns its placeholder, cast to the column's type.
    fn placeholder(&mut self, entity: &ResolvedEntity, col: &str, v: Value) -> String {
        let n = self.push_param(v);
        match entity.column(col) {
            Some(c) => format!("${}::{}", n, c.pg_type),
            None => format!("${}", n),
        }
    }
}

/// Escape LIKE metacharacters and wrap in `%` for substring matching.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn select_column_list(entity: &ResolvedEntity) -> String {
    entity
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn live_row_condition(entity: &ResolvedEntity) -> Option<String> {
    entity
        .soft_delete_column
        .as_ref()
        .map(|c| format!("{} IS NULL", quoted(c)))
}

/// WHERE clause shared by list and count: live rows, equality filters, search disjunction.
fn list_where(
    entity: &ResolvedEntity,
    q: &mut QueryBuf,
    filters: &[(String, Value)],
    search: Option<&str>,
) -> String {
    let mut parts: Vec<String> = live_row_condition(entity).into_iter().collect();
    for (col, val) in filters {
        if entity.filterable.iter().any(|f| f == col) {
            let ph = q.placeholder(entity, col, val.clone());
            parts.push(format!("{} = {}", quoted(col), ph));
        }
    }
    if let Some(term) = search.filter(|s| !s.is_empty()) {
        if !entity.searchable.is_empty() {
            let n = q.push_param(Value::String(like_pattern(term)));
            let ors: Vec<String> = entity
                .searchable
                .iter()
                .map(|c| format!("{}::text ILIKE ${}", quoted(c), n))
                .collect();
            parts.push(format!("({})", ors.join(" OR ")));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// COUNT(*) over the same matching set as `select_list`, before pagination.
pub fn count_list(entity: &ResolvedEntity, filters: &[(String, Value)], search: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = list_where(entity, &mut q, filters, search);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table(entity), where_clause);
    q
}

/// SELECT list, newest first, with LIMIT/OFFSET.
pub fn select_list(
    entity: &ResolvedEntity,
    filters: &[(String, Value)],
    search: Option<&str>,
    limit: u32,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = list_where(entity, &mut q, filters, search);
    let order = quoted(entity.order_column());
    let pk = quoted(&entity.pk_column);
    let order_clause = if order == pk {
        format!(" ORDER BY {} DESC", pk)
    } else {
        format!(" ORDER BY {} DESC, {} DESC", order, pk)
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(entity),
        qualified_table(entity),
        where_clause,
        order_clause,
        limit,
        offset
    );
    q
}

fn by_id_condition(entity: &ResolvedEntity, q: &mut QueryBuf, id: &Value) -> String {
    let ph = q.placeholder(entity, &entity.pk_column, id.clone());
    let mut cond = format!("{} = {}", quoted(&entity.pk_column), ph);
    if let Some(live) = live_row_condition(entity) {
        cond.push_str(" AND ");
        cond.push_str(&live);
    }
    cond
}

/// SELECT one live row by primary key.
pub fn select_by_id(entity: &ResolvedEntity, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cond = by_id_condition(entity, &mut q, id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(entity),
        qualified_table(entity),
        cond
    );
    q
}

/// INSERT writable columns present in body; absent columns fall back to DB defaults.
pub fn insert(entity: &ResolvedEntity, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns.iter().filter(|c| c.writable) {
        let Some(v) = body.get(&c.name) else { continue };
        placeholders.push(q.placeholder(entity, &c.name, v.clone()));
        cols.push(quoted(&c.name));
    }
    let table = qualified_table(entity);
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE a live row: SET only writable columns present in body, refresh updated_at.
pub fn update(entity: &ResolvedEntity, id: &Value, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in entity.columns.iter().filter(|c| c.writable) {
        let Some(v) = body.get(&c.name) else { continue };
        let ph = q.placeholder(entity, &c.name, v.clone());
        sets.push(format!("{} = {}", quoted(&c.name), ph));
    }
    if let Some(updated_at) = &entity.updated_at_column {
        sets.push(format!("{} = NOW()", quoted(updated_at)));
    }
    if sets.is_empty() {
        return select_by_id(entity, id);
    }
    let cond = by_id_condition(entity, &mut q, id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        qualified_table(entity),
        sets.join(", "),
        cond,
        select_column_list(entity)
    );
    q
}

/// Marks a live row deleted. Without a soft-delete column the row is removed.
pub fn delete(entity: &ResolvedEntity, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(entity);
    let cond = by_id_condition(entity, &mut q, id);
    q.sql = match &entity.soft_delete_column {
        Some(deleted_at) => {
            let mut sets = vec![format!("{} = NOW()", quoted(deleted_at))];
            if let Some(updated_at) = &entity.updated_at_column {
                sets.push(format!("{} = NOW()", quoted(updated_at)));
            }
            format!("UPDATE {} SET {} WHERE {}", table, sets.join(", "), cond)
        }
        None => format!("DELETE FROM {} WHERE {}", table, cond),
    };
    q
}
