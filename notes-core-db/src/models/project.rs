use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;
use super::task::TaskModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub id: i64,
    pub name: HeaplessString<100>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Tasks of the project, only present when eager-loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskModel>>,
}

impl Identifiable for ProjectModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for ProjectModel {
    const TABLE: &'static str = "project";
    const COLUMNS: &'static [&'static str] = &["name", "description", "created_at", "updated_at"];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Projects);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "name" => FieldValue::from(&self.name),
            "description" => FieldValue::from(self.description.clone()),
            "created_at" => FieldValue::from(self.created_at),
            "updated_at" => FieldValue::from(self.updated_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "name" => self.name = value.bounded(column)?,
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
