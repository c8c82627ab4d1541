use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for a wordlist entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WordInput {
    #[validate(length(min = 1, max = 100))]
    pub value: String,

    pub definition: Option<String>,
}
