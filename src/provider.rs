//! The CRUD provider contract every resource implements, plus the request-side
//! types shared by all providers.

use crate::error::AppError;
use crate::schema::{PkType, Schema};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Filters plus pagination for `list`. `search` is carried as a filter key.
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filters: HashMap<String, String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filters: HashMap::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Split raw query params into page, limit and filters. Bad or non-positive
    /// page/limit fall back to defaults; limit is capped at `MAX_LIMIT`.
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let positive = |v: Option<String>| v.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n >= 1);
        let page = positive(params.remove("page")).unwrap_or(DEFAULT_PAGE);
        let limit = positive(params.remove("limit")).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        ListQuery {
            filters: params,
            page,
            limit,
        }
    }

    pub fn with_filter(mut self, key: &str, value: &str) -> Self {
        self.filters.insert(key.to_string(), value.to_string());
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Trimmed search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.filters
            .get("search")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// One page of results. `total` counts the whole matching set.
#[derive(Clone, Debug, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// CRUD capability of a resource. Implementations either write each verb by
/// hand or delegate to [`crate::service::CrudService`].
#[async_trait]
pub trait CrudProvider: Send + Sync + 'static {
    type Entity: Serialize + Send;
    type Create: DeserializeOwned + Send;
    type Patch: DeserializeOwned + Send;

    /// Stable resource identifier; also the route segment.
    fn model_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn list(&self, query: ListQuery) -> Result<ListPage<Self::Entity>, AppError>;

    async fn get(&self, id: &str) -> Result<Self::Entity, AppError>;

    async fn create(&self, input: Self::Create) -> Result<Self::Entity, AppError>;

    /// Applies only the fields present in `patch`.
    async fn update(&self, id: &str, patch: Self::Patch) -> Result<Self::Entity, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Parse a path id for the given key type. Runs before any store access.
pub fn parse_id(id_str: &str, pk_type: &PkType) -> Result<Value, AppError> {
    let id_str = id_str.trim();
    Ok(match pk_type {
        PkType::Uuid => {
            let u = uuid::Uuid::parse_str(id_str)
                .map_err(|_| AppError::InvalidArgument(format!("invalid id '{}': expected uuid", id_str)))?;
            Value::String(u.to_string())
        }
        PkType::BigInt | PkType::Int => {
            let n: i64 = id_str
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::InvalidArgument(format!("invalid id '{}': expected positive integer", id_str)))?;
            if *pk_type == PkType::Int && i32::try_from(n).is_err() {
                return Err(AppError::InvalidArgument(format!("invalid id '{}': out of range", id_str)));
            }
            Value::Number(n.into())
        }
        PkType::Text => {
            if id_str.is_empty() {
                return Err(AppError::InvalidArgument("empty id".into()));
            }
            Value::String(id_str.to_string())
        }
    })
}

/// Serialize a typed input into a column map. `None` fields tagged with
/// `skip_serializing_if = "Option::is_none"` do not appear.
pub fn to_column_map<T: Serialize>(input: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("input must serialize to an object".into())),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}
