use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TagInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(max = 16))]
    pub color: Option<String>,
}
