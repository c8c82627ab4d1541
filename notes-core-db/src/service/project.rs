use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::ProjectInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges};
use crate::models::{ProjectModel, TaskModel};
use crate::repository::FindWhere;

use super::ensure_no_dependents;

/// A project with tasks cannot be deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectHooks;

#[async_trait]
impl<S> CrudHooks<S> for ProjectHooks
where
    S: FindWhere<TaskModel> + Send + Sync,
{
    type Input = ProjectInput;
    type Entity = ProjectModel;

    fn transform(&self, input: &ProjectInput) -> CrudResult<ProjectModel> {
        let now = Utc::now();
        Ok(ProjectModel {
            id: 0,
            name: to_bounded("name", &input.name)?,
            description: non_empty(input.description.as_deref()).map(str::to_string),
            created_at: now,
            updated_at: now,
            tasks: None,
        })
    }

    fn compute_updates(&self, existing: &ProjectModel, input: &ProjectInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes.required("name", &existing.name, &input.name).optional(
            "description",
            existing.description.as_deref(),
            input.description.as_deref(),
        );
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, _store: &S, input: &ProjectInput, _id: i64) -> CrudResult<()> {
        input.validate()?;
        Ok(())
    }

    async fn validate_delete(&self, store: &S, project: &ProjectModel) -> CrudResult<()> {
        ensure_no_dependents::<_, TaskModel>(
            store,
            "project_id",
            project.id,
            format!("project '{}' still has tasks", project.name),
        )
        .await
    }
}
