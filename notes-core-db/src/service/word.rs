use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::WordInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges};
use crate::models::WordModel;
use crate::repository::FindWhere;

use super::ensure_unique;

#[derive(Debug, Clone, Copy, Default)]
pub struct WordHooks;

#[async_trait]
impl<S> CrudHooks<S> for WordHooks
where
    S: FindWhere<WordModel> + Send + Sync,
{
    type Input = WordInput;
    type Entity = WordModel;

    fn transform(&self, input: &WordInput) -> CrudResult<WordModel> {
        let now = Utc::now();
        Ok(WordModel {
            id: 0,
            value: to_bounded("value", &input.value)?,
            definition: non_empty(input.definition.as_deref()).map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    fn compute_updates(&self, existing: &WordModel, input: &WordInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes.required("value", &existing.value, &input.value).optional(
            "definition",
            existing.definition.as_deref(),
            input.definition.as_deref(),
        );
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, store: &S, input: &WordInput, id: i64) -> CrudResult<()> {
        input.validate()?;
        ensure_unique::<_, WordModel>(store, "value", &input.value, id, "word").await
    }
}
