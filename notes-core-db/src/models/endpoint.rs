use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

/// # Documentation
/// An endpoint (URL, optionally with method) discovered for a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointModel {
    pub id: i64,

    /// Owning program
    pub program_id: i64,

    pub url: String,

    pub method: Option<HeaplessString<10>>,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for EndpointModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for EndpointModel {
    const TABLE: &'static str = "endpoint";
    const COLUMNS: &'static [&'static str] = &[
        "program_id",
        "url",
        "method",
        "description",
        "created_at",
        "updated_at",
    ];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Endpoints);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "program_id" => FieldValue::from(self.program_id),
            "url" => FieldValue::from(self.url.as_str()),
            "method" => FieldValue::from(self.method.as_ref()),
            "description" => FieldValue::from(self.description.clone()),
            "created_at" => FieldValue::from(self.created_at),
            "updated_at" => FieldValue::from(self.updated_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "program_id" => self.program_id = value.required_int(column)?,
                "url" => self.url = value.required_text(column)?,
                "method" => self.method = value.optional_bounded(column)?,
                "description" => self.description = value.text(column)?,
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
