pub mod alias;
pub mod endpoint;
pub mod entity;
pub mod identifiable;
pub mod memory_sheet;
pub mod program;
pub mod project;
pub mod tag;
pub mod tagging;
pub mod task;
pub mod word;

pub use alias::*;
pub use endpoint::*;
pub use entity::*;
pub use identifiable::*;
pub use memory_sheet::*;
pub use program::*;
pub use project::*;
pub use tag::*;
pub use tagging::*;
pub use task::*;
pub use word::*;
