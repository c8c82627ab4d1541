use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use notes_core_db::models::{
    AliasModel, EndpointModel, MemorySheetModel, ProgramModel, ProjectModel, TagModel, TaggingModel,
    TaskModel, WordModel,
};

use crate::utils::{get_heapless_string, get_optional_heapless_string, get_parsed, TryFromRow};

impl TryFromRow<PgRow> for ProgramModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ProgramModel {
            id: row.try_get("id")?,
            name: get_heapless_string(row, "name")?,
            platform: get_optional_heapless_string(row, "platform")?,
            url: row.try_get("url")?,
            scope: row.try_get("scope")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            endpoints: None,
        })
    }
}

impl TryFromRow<PgRow> for EndpointModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(EndpointModel {
            id: row.try_get("id")?,
            program_id: row.try_get("program_id")?,
            url: row.try_get("url")?,
            method: get_optional_heapless_string(row, "method")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for TagModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(TagModel {
            id: row.try_get("id")?,
            name: get_heapless_string(row, "name")?,
            color: get_optional_heapless_string(row, "color")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFromRow<PgRow> for TaggingModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(TaggingModel {
            id: row.try_get("id")?,
            tag_id: row.try_get("tag_id")?,
            reference_id: row.try_get("reference_id")?,
            reference_type: get_parsed(row, "reference_type")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFromRow<PgRow> for WordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(WordModel {
            id: row.try_get("id")?,
            value: get_heapless_string(row, "value")?,
            definition: row.try_get("definition")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for ProjectModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ProjectModel {
            id: row.try_get("id")?,
            name: get_heapless_string(row, "name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            tasks: None,
        })
    }
}

impl TryFromRow<PgRow> for TaskModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(TaskModel {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            title: get_heapless_string(row, "title")?,
            description: row.try_get("description")?,
            status: get_parsed(row, "status")?,
            due_at: row.try_get("due_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for MemorySheetModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(MemorySheetModel {
            id: row.try_get("id")?,
            title: get_heapless_string(row, "title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for AliasModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(AliasModel {
            id: row.try_get("id")?,
            reference_id: row.try_get("reference_id")?,
            reference_type: get_parsed(row, "reference_type")?,
            name: get_heapless_string(row, "name")?,
            name_hash: row.try_get("name_hash")?,
        })
    }
}
