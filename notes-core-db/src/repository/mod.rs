pub mod alias_store;
pub mod create;
pub mod delete;
pub mod entity_store;
pub mod find_where;
pub mod first;
pub mod key_filter;
pub mod list;
pub mod pagination;
pub mod transaction;
pub mod updates;

// Re-exports
pub use alias_store::*;
pub use create::*;
pub use delete::*;
pub use entity_store::*;
pub use find_where::*;
pub use first::*;
pub use key_filter::*;
pub use list::*;
pub use pagination::{Page, PageRequest};
pub use transaction::*;
pub use updates::*;
