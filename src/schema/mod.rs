//! Schema descriptors: declaration, validation, and resolution against a table.

pub mod types;
pub mod resolved;
pub mod validator;

pub use resolved::*;
pub use types::*;
pub use validator::validate;
