//! Pluggable CRUD modules over PostgreSQL. Ships the todos resource.

pub mod error;
pub mod handlers;
pub mod migration;
pub mod module;
pub mod provider;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod todo;

pub use error::{AppError, ConfigError, SchemaError, StoreError, ValidationErrors};
pub use module::{Module, ModuleRegistry};
pub use provider::{parse_id, CrudProvider, ListPage, ListQuery};
pub use response::{success_one, success_one_ok, success_page};
pub use routes::{common_routes, crud_routes};
pub use schema::{resolve, Field, FieldType, PkType, ResolvedEntity, Schema, TableBinding};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
pub use todo::{NewTodo, Todo, TodoModule, TodoPatch};
