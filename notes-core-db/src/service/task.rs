use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use notes_core_api::TaskInput;

use crate::crud::{non_empty, ChangeSet, CrudHooks, CrudResult};
use crate::models::entity::{to_bounded, FieldChanges, FieldValue};
use crate::models::{ProjectModel, TaskModel};
use crate::repository::First;

use super::ensure_exists;

/// Tasks may belong to a project, which must exist. A `project_id` of 0
/// detaches the task from its project.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskHooks;

fn project_of(input: &TaskInput) -> Option<i64> {
    input.project_id.filter(|id| *id > 0)
}

#[async_trait]
impl<S> CrudHooks<S> for TaskHooks
where
    S: First<ProjectModel> + Send + Sync,
{
    type Input = TaskInput;
    type Entity = TaskModel;

    fn transform(&self, input: &TaskInput) -> CrudResult<TaskModel> {
        let now = Utc::now();
        Ok(TaskModel {
            id: 0,
            project_id: project_of(input),
            title: to_bounded("title", &input.title)?,
            description: non_empty(input.description.as_deref()).map(str::to_string),
            status: input.status.unwrap_or_default(),
            due_at: input.due_at,
            created_at: now,
            updated_at: now,
        })
    }

    fn compute_updates(&self, existing: &TaskModel, input: &TaskInput) -> CrudResult<FieldChanges> {
        let mut changes = ChangeSet::new();
        changes.required("title", &existing.title, &input.title).optional(
            "description",
            existing.description.as_deref(),
            input.description.as_deref(),
        );
        if input.project_id.is_some() {
            changes.value(
                "project_id",
                FieldValue::from(existing.project_id),
                FieldValue::from(project_of(input)),
            );
        }
        if let Some(status) = input.status {
            changes.value(
                "status",
                FieldValue::from(existing.status.as_str()),
                FieldValue::from(status.as_str()),
            );
        }
        if let Some(due_at) = input.due_at {
            changes.value("due_at", FieldValue::from(existing.due_at), FieldValue::from(due_at));
        }
        Ok(changes.touched("updated_at"))
    }

    async fn validate_write(&self, store: &S, input: &TaskInput, _id: i64) -> CrudResult<()> {
        input.validate()?;
        match project_of(input) {
            Some(project_id) => ensure_exists::<_, ProjectModel>(store, project_id, "project").await,
            None => Ok(()),
        }
    }
}
