use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity_type::EntityType;

/// Attaches a tag to any taggable entity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaggingInput {
    #[validate(range(min = 1))]
    pub tag_id: i64,

    #[validate(range(min = 1))]
    pub reference_id: i64,

    pub reference_type: EntityType,
}
