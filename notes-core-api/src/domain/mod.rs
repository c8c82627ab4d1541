pub mod endpoint;
pub mod entity_type;
pub mod memory_sheet;
pub mod program;
pub mod project;
pub mod tag;
pub mod tagging;
pub mod task;
pub mod task_status;
pub mod word;

pub use endpoint::*;
pub use entity_type::*;
pub use memory_sheet::*;
pub use program::*;
pub use project::*;
pub use tag::*;
pub use tagging::*;
pub use task::*;
pub use task_status::*;
pub use word::*;
