use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

/// # Documentation
/// Join row attaching a tag to any taggable entity, addressed by the
/// compound key (reference_id, reference_type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggingModel {
    pub id: i64,
    pub tag_id: i64,
    pub reference_id: i64,
    pub reference_type: EntityType,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for TaggingModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for TaggingModel {
    const TABLE: &'static str = "tagging";
    const COLUMNS: &'static [&'static str] =
        &["tag_id", "reference_id", "reference_type", "created_at"];

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "tag_id" => FieldValue::from(self.tag_id),
            "reference_id" => FieldValue::from(self.reference_id),
            "reference_type" => FieldValue::from(self.reference_type),
            "created_at" => FieldValue::from(self.created_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "tag_id" => self.tag_id = value.required_int(column)?,
                "reference_id" => self.reference_id = value.required_int(column)?,
                "reference_type" => self.reference_type = value.parsed(column)?,
                "created_at" => self.created_at = value.required_timestamp(column)?,
                other => {
                    return Err(FieldError::UnknownColumn {
                        column: other.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}
