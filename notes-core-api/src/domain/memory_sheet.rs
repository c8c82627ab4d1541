use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for a memory sheet: a titled free-form cheat sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MemorySheetInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(max = 100000))]
    pub content: String,
}
