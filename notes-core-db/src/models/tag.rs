use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagModel {
    pub id: i64,
    pub name: HeaplessString<50>,
    pub color: Option<HeaplessString<16>>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for TagModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for TagModel {
    const TABLE: &'static str = "tag";
    const COLUMNS: &'static [&'static str] = &["name", "color", "created_at"];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Tags);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "name" => FieldValue::from(&self.name),
            "color" => FieldValue::from(self.color.as_ref()),
            "created_at" => FieldValue::from(self.created_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "name" => self.name = value.bounded(column)?,
                "color" => self.color = value.optional_bounded(column)?,
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
