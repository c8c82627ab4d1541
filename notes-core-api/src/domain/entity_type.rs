use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ApiError;

/// Type tag naming the kind of entity an alias or tagging points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Programs,
    Endpoints,
    Tags,
    Words,
    Tasks,
    Projects,
    MemorySheets,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Programs,
        EntityType::Endpoints,
        EntityType::Tags,
        EntityType::Words,
        EntityType::Tasks,
        EntityType::Projects,
        EntityType::MemorySheets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Programs => "programs",
            EntityType::Endpoints => "endpoints",
            EntityType::Tags => "tags",
            EntityType::Words => "words",
            EntityType::Tasks => "tasks",
            EntityType::Projects => "projects",
            EntityType::MemorySheets => "memory_sheets",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ApiError::ValidationError(format!("unknown entity type '{s}'")))
    }
}
