use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EndpointInput {
    #[validate(range(min = 1))]
    pub program_id: i64,

    #[validate(length(min = 1, max = 2048))]
    pub url: String,

    #[validate(length(max = 10))]
    pub method: Option<String>,

    pub description: Option<String>,
}
