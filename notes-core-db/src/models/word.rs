use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

/// # Documentation
/// Wordlist entry (parameter names, paths, payload fragments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordModel {
    pub id: i64,
    pub value: HeaplessString<100>,
    pub definition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for WordModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for WordModel {
    const TABLE: &'static str = "word";
    const COLUMNS: &'static [&'static str] = &["value", "definition", "created_at", "updated_at"];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Words);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "value" => FieldValue::from(&self.value),
            "definition" => FieldValue::from(self.definition.clone()),
            "created_at" => FieldValue::from(self.created_at),
            "updated_at" => FieldValue::from(self.updated_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "value" => self.value = value.bounded(column)?,
                "definition" => self.definition = value.text(column)?,
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
