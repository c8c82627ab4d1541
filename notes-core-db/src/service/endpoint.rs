use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::EndpointInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges, FieldValue};
use crate::models::{EndpointModel, ProgramModel};
use crate::repository::First;

use super::ensure_exists;

/// Endpoints must belong to an existing program.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointHooks;

#[async_trait]
impl<S> CrudHooks<S> for EndpointHooks
where
    S: First<ProgramModel> + Send + Sync,
{
    type Input = EndpointInput;
    type Entity = EndpointModel;

    fn transform(&self, input: &EndpointInput) -> CrudResult<EndpointModel> {
        let now = Utc::now();
        Ok(EndpointModel {
            id: 0,
            program_id: input.program_id,
            url: input.url.clone(),
            method: non_empty(input.method.as_deref())
                .map(|method| to_bounded("method", method))
                .transpose()?,
            description: non_empty(input.description.as_deref()).map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    fn compute_updates(&self, existing: &EndpointModel, input: &EndpointInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes
            .value(
                "program_id",
                FieldValue::from(existing.program_id),
                FieldValue::from(input.program_id),
            )
            .required("url", &existing.url, &input.url)
            .optional("method", existing.method.as_deref(), input.method.as_deref())
            .optional(
                "description",
                existing.description.as_deref(),
                input.description.as_deref(),
            );
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, store: &S, input: &EndpointInput, _id: i64) -> CrudResult<()> {
        input.validate()?;
        ensure_exists::<_, ProgramModel>(store, input.program_id, "program").await
    }
}
