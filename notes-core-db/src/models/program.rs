use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::endpoint::EndpointModel;
use super::entity::{Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;

/// # Documentation
/// A bug bounty or pentest program: the root that endpoints hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramModel {
    pub id: i64,

    pub name: HeaplessString<100>,

    /// Hosting platform (HackerOne, Bugcrowd, private, ...)
    pub platform: Option<HeaplessString<50>>,

    pub url: Option<String>,

    /// Free-form scope notes
    pub scope: Option<String>,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Endpoints of the program, only present when eager-loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<EndpointModel>>,
}

impl Identifiable for ProgramModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for ProgramModel {
    const TABLE: &'static str = "program";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "platform",
        "url",
        "scope",
        "description",
        "created_at",
        "updated_at",
    ];
    const ENTITY_TYPE: Option<EntityType> = Some(EntityType::Programs);

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "name" => FieldValue::from(&self.name),
            "platform" => FieldValue::from(self.platform.as_ref()),
            "url" => FieldValue::from(self.url.clone()),
            "scope" => FieldValue::from(self.scope.clone()),
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
                "platform" => self.platform = value.optional_bounded(column)?,
                "url" => self.url = value.text(column)?,
                "scope" => self.scope = value.text(column)?,
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
