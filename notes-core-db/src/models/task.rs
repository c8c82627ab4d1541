use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::{EntityType, TaskStatus};

use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

/// # Documentation
/// A to-do item, optionally grouped under a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModel {
    pub id: i64,

    /// Owning project, if any
    pub project_id: Option<i64>,

    pub title: HeaplessString<200>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for TaskModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for TaskModel {
    const TABLE: &'static str = "task";
    const COLUMNS: &'static [&'static str] = &[
        "project_id",
        "title",
        "description",
        "status",
        "due_at",
        "created_at",
        "updated_at",
    ];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Tasks);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "project_id" => FieldValue::from(self.project_id),
            "title" => FieldValue::from(&self.title),
            "description" => FieldValue::from(self.description.clone()),
            "status" => FieldValue::from(self.status.as_str()),
            "due_at" => FieldValue::from(self.due_at),
            "created_at" => FieldValue::from(self.created_at),
            "updated_at" => FieldValue::from(self.updated_at),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "project_id" => self.project_id = value.int(column)?,
                "title" => self.title = value.bounded(column)?,
                "description" => self.description = value.text(column)?,
                "status" => self.status = value.parsed(column)?,
                "due_at" => self.due_at = value.timestamp(column)?,
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
