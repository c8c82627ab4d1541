use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::MemorySheetInput;

use crate::crud::{ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges};
use crate::models::MemorySheetModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySheetHooks;

#[async_trait]
impl<S> CrudHooks<S> for MemorySheetHooks
where
    S: Send + Sync,
{
    type Input = MemorySheetInput;
    type Entity = MemorySheetModel;

    fn transform(&self, input: &MemorySheetInput) -> CrudResult<MemorySheetModel> {
        let now = Utc::now();
        Ok(MemorySheetModel {
            id: 0,
            title: to_bounded("title", &input.title)?,
            content: input.content.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn compute_updates(
        &self,
        existing: &MemorySheetModel,
        input: &MemorySheetInput,
    ) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes
            .required("title", &existing.title, &input.title)
            .required("content", &existing.content, &input.content);
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, _store: &S, input: &MemorySheetInput, _id: i64) -> CrudResult<()> {
        input.validate()?;
        Ok(())
    }
}
