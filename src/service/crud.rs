//! Generic CRUD execution against PostgreSQL, shared by every resource.

use crate::error::AppError;
use crate::provider::{ListPage, ListQuery};
use crate::schema::ResolvedEntity;
use crate::sql::{count_list, delete, insert, select_by_id, select_list, update, PgBindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

pub struct CrudService;

impl CrudService {
    /// Count the matching live rows, then fetch one page of them newest first.
    pub async fn list<T>(pool: &PgPool, entity: &ResolvedEntity, query: &ListQuery) -> Result<ListPage<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let filters = entity.typed_filters(&query.filters);
        let search = query.search();

        let count = count_list(entity, &filters, search);
        let total = Self::fetch_count(pool, &count).await?;

        let q = select_list(entity, &filters, search, query.limit, query.offset());
        let items = Self::fetch_all(pool, &q).await?;

        Ok(ListPage {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    /// Fetch one live row by primary key.
    pub async fn read<T>(pool: &PgPool, entity: &ResolvedEntity, id: &Value) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = select_by_id(entity, id);
        Self::fetch_optional(pool, &q).await
    }

    /// Insert one row from a column map. Returns the stored row.
    pub async fn create<T>(pool: &PgPool, entity: &ResolvedEntity, body: &Map<String, Value>) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = insert(entity, body);
        Self::fetch_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Update the columns present in `body` on a live row. `None` when no such row.
    pub async fn update<T>(
        pool: &PgPool,
        entity: &ResolvedEntity,
        id: &Value,
        body: &Map<String, Value>,
    ) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = update(entity, id, body);
        Self::fetch_optional(pool, &q).await
    }

    /// Soft-delete one live row. Returns whether a row was affected.
    pub async fn delete(pool: &PgPool, entity: &ResolvedEntity, id: &Value) -> Result<bool, AppError> {
        let q = delete(entity, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let result = query.execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_count(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let n = query.fetch_one(pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn fetch_all<T>(pool: &PgPool, q: &QueryBuf) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_all(pool).await?)
    }

    async fn fetch_optional<T>(pool: &PgPool, q: &QueryBuf) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_optional(pool).await?)
    }
}
