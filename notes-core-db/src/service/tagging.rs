use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::TaggingInput;

use crate::crud::{ChangeSet, CrudError, CrudHooks, CrudResult};
use crate::models::entity::{FieldChanges, FieldValue};
use crate::models::{TagModel, TaggingModel};
use crate::repository::{FindWhere, First, KeyFilter};

use super::ensure_exists;

/// A tagging needs an existing tag and may not repeat one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggingHooks;

#[async_trait]
impl<S> CrudHooks<S> for TaggingHooks
where
    S: First<TagModel> + FindWhere<TaggingModel> + Send + Sync,
{
    type Input = TaggingInput;
    type Entity = TaggingModel;

    fn transform(&self, input: &TaggingInput) -> CrudResult<TaggingModel> {
        Ok(TaggingModel {
            id: 0,
            tag_id: input.tag_id,
            reference_id: input.reference_id,
            reference_type: input.reference_type,
            created_at: Utc::now(),
        })
    }

    fn compute_updates(&self, existing: &TaggingModel, input: &TaggingInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes
            .value("tag_id", FieldValue::from(existing.tag_id), FieldValue::from(input.tag_id))
            .value(
                "reference_id",
                FieldValue::from(existing.reference_id),
                FieldValue::from(input.reference_id),
            )
            .value(
                "reference_type",
                FieldValue::from(existing.reference_type),
                FieldValue::from(input.reference_type),
            );
        Ok(changes.into_changes())
    }

    async fn validate_write(&self, store: &S, input: &TaggingInput, id: i64) -> CrudResult<()> {
        input.validate()?;
        ensure_exists::<_, TagModel>(store, input.tag_id, "tag").await?;

        let filter = KeyFilter::reference(
            "reference_id",
            "reference_type",
            [(input.reference_id, input.reference_type)],
        );
        let existing = FindWhere::<TaggingModel>::find_where(store, &filter).await?;
        if existing
            .iter()
            .any(|tagging| tagging.tag_id == input.tag_id && tagging.id != id)
        {
            return Err(CrudError::validation(format!(
                "{} {} is already tagged with tag {}",
                input.reference_type, input.reference_id, input.tag_id
            )));
        }
        Ok(())
    }
}
