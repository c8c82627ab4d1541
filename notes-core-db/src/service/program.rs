use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::ProgramInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges};
use crate::models::{EndpointModel, ProgramModel};
use crate::repository::FindWhere;

use super::{ensure_no_dependents, ensure_unique};

/// Program names are unique; a program with endpoints cannot be deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramHooks;

#[async_trait]
impl<S> CrudHooks<S> for ProgramHooks
where
    S: FindWhere<ProgramModel> + FindWhere<EndpointModel> + Send + Sync,
{
    type Input = ProgramInput;
    type Entity = ProgramModel;

    fn transform(&self, input: &ProgramInput) -> CrudResult<ProgramModel> {
        let now = Utc::now();
        Ok(ProgramModel {
            id: 0,
            name: to_bounded("name", &input.name)?,
            platform: non_empty(input.platform.as_deref())
                .map(|platform| to_bounded("platform", platform))
                .transpose()?,
            url: non_empty(input.url.as_deref()).map(str::to_string),
            scope: non_empty(input.scope.as_deref()).map(str::to_string),
            description: non_empty(input.description.as_deref()).map(str::to_string),
            created_at: now,
            updated_at: now,
            endpoints: None,
        })
    }

    fn compute_updates(&self, existing: &ProgramModel, input: &ProgramInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes
            .required("name", &existing.name, &input.name)
            .optional("platform", existing.platform.as_deref(), input.platform.as_deref())
            .optional("url", existing.url.as_deref(), input.url.as_deref())
            .optional("scope", existing.scope.as_deref(), input.scope.as_deref())
            .optional(
                "description",
                existing.description.as_deref(),
                input.description.as_deref(),
            );
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, store: &S, input: &ProgramInput, id: i64) -> CrudResult<()> {
        input.validate()?;
        ensure_unique::<_, ProgramModel>(store, "name", &input.name, id, "program").await
    }

    async fn validate_delete(&self, store: &S, program: &ProgramModel) -> CrudResult<()> {
        ensure_no_dependents::<_, EndpointModel>(
            store,
            "program_id",
            program.id,
            format!("program '{}' still has endpoints", program.name),
        )
        .await
    }
}
