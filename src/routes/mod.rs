//! Routers: service routes and per-provider CRUD.

pub mod common;
pub mod crud;

pub use common::common_routes;
pub use crud::crud_routes;
