//! Generic entity CRUD with pluggable per-entity hooks.

pub mod changes;
pub mod error;
pub mod generic;
pub mod hooks;

pub use changes::{non_empty, ChangeSet};
pub use error::{CrudError, CrudResult};
pub use generic::GenericCrud;
pub use hooks::CrudHooks;
