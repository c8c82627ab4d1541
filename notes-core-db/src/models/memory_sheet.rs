use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySheetModel {
    pub id: i64,
    pub title: HeaplessString<100>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for MemorySheetModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for MemorySheetModel {
    const TABLE: &'static str = "memory_sheet";
    const COLUMNS: &'static [&'static str] = &["title", "content", "created_at", "updated_at"];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::MemorySheets);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "title" => FieldValue::from(&self.title),
            "content" => FieldValue::from(self.content.as_str()),
            "created_at" => FieldValue::from(self.created_at),
            "updated_at" => FieldValue::from(self.updated_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "title" => self.title = value.bounded(column)?,
                "content" => self.content = value.required_text(column)?,
                "created_at" => self.created_at = value.required_timestamp(column)?,
                "updated_at" => self.updated_at = value.required_timestamp(column)?,
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
