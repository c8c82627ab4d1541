use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::TagInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges};
use crate::models::{TagModel, TaggingModel};
use crate::repository::FindWhere;

use super::{ensure_no_dependents, ensure_unique};

/// Tag names are unique; a tag in use cannot be deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagHooks;

#[async_trait]
impl<S> CrudHooks<S> for TagHooks
where
    S: FindWhere<TagModel> + FindWhere<TaggingModel> + Send + Sync,
{
    type Input = TagInput;
    type Entity = TagModel;

    fn transform(&self, input: &TagInput) -> CrudResult<TagModel> {
        Ok(TagModel {
            id: 0,
            name: to_bounded("name", &input.name)?,
            color: non_empty(input.color.as_deref())
                .map(|color| to_bounded("color", color))
                .transpose()?,
            created_at: Utc::now(),
        })
    }

    fn compute_updates(&self, existing: &TagModel, input: &TagInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes
            .required("name", &existing.name, &input.name)
            .optional("color", existing.color.as_deref(), input.color.as_deref());
        Ok(changes.into_changes())
    }

    async fn validate_write(&self, store: &S, input: &TagInput, id: i64) -> CrudResult<()> {
        input.validate()?;
        ensure_unique::<_, TagModel>(store, "name", &input.name, id, "tag").await
    }

    async fn validate_delete(&self, store: &S, tag: &TagModel) -> CrudResult<()> {
        ensure_no_dependents::<_, TaggingModel>(
            store,
            "tag_id",
            tag.id,
            format!("tag '{}' is still in use", tag.name),
        )
        .await
    }
}
