//! Typed CRUD services, one per entity.

pub mod endpoint;
pub mod memory_sheet;
pub mod program;
pub mod project;
pub mod tag;
pub mod tagging;
pub mod task;
pub mod word;

pub use endpoint::EndpointHooks;
pub use memory_sheet::MemorySheetHooks;
pub use program::ProgramHooks;
pub use project::ProjectHooks;
pub use tag::TagHooks;
pub use tagging::TaggingHooks;
pub use task::TaskHooks;
pub use word::WordHooks;

use std::sync::Arc;

use crate::crud::{CrudError, CrudResult, GenericCrud};
use crate::models::entity::Entity;
use crate::models::{
    EndpointModel, MemorySheetModel, ProgramModel, ProjectModel, TagModel, TaggingModel,
    TaskModel, WordModel,
};
use crate::repository::{AliasStore, EntityStore, FindWhere, First, KeyFilter, Transactional};

pub type ProgramService<S> = GenericCrud<S, ProgramHooks>;
pub type EndpointService<S> = GenericCrud<S, EndpointHooks>;
pub type TagService<S> = GenericCrud<S, TagHooks>;
pub type TaggingService<S> = GenericCrud<S, TaggingHooks>;
pub type WordService<S> = GenericCrud<S, WordHooks>;
pub type ProjectService<S> = GenericCrud<S, ProjectHooks>;
pub type TaskService<S> = GenericCrud<S, TaskHooks>;
pub type MemorySheetService<S> = GenericCrud<S, MemorySheetHooks>;

/// Stores backing every service.
pub trait ServiceStore:
    EntityStore<ProgramModel>
    + EntityStore<EndpointModel>
    + EntityStore<TagModel>
    + EntityStore<TaggingModel>
    + EntityStore<WordModel>
    + EntityStore<ProjectModel>
    + EntityStore<TaskModel>
    + EntityStore<MemorySheetModel>
    + AliasStore
    + Transactional
    + 'static
{
}

impl<S> ServiceStore for S where
    S: EntityStore<ProgramModel>
        + EntityStore<EndpointModel>
        + EntityStore<TagModel>
        + EntityStore<TaggingModel>
        + EntityStore<WordModel>
        + EntityStore<ProjectModel>
        + EntityStore<TaskModel>
        + EntityStore<MemorySheetModel>
        + AliasStore
        + Transactional
        + 'static
{
}

/// One CRUD service per entity, sharing one store.
pub struct Services<S> {
    pub programs: ProgramService<S>,
    pub endpoints: EndpointService<S>,
    pub tags: TagService<S>,
    pub taggings: TaggingService<S>,
    pub words: WordService<S>,
    pub projects: ProjectService<S>,
    pub tasks: TaskService<S>,
    pub memory_sheets: MemorySheetService<S>,
}

impl<S: ServiceStore> Services<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            programs: GenericCrud::new(store.clone(), ProgramHooks),
            endpoints: GenericCrud::new(store.clone(), EndpointHooks),
            tags: GenericCrud::new(store.clone(), TagHooks),
            taggings: GenericCrud::new(store.clone(), TaggingHooks),
            words: GenericCrud::new(store.clone(), WordHooks),
            projects: GenericCrud::new(store.clone(), ProjectHooks),
            tasks: GenericCrud::new(store.clone(), TaskHooks),
            memory_sheets: GenericCrud::new(store, MemorySheetHooks),
        }
    }
}

/// Reject `value` if another row already holds it in `column`.
pub(crate) async fn ensure_unique<S, E>(
    store: &S,
    column: &'static str,
    value: &str,
    id: i64,
    label: &str,
) -> CrudResult<()>
where
    S: FindWhere<E>,
    E: Entity,
{
    let rows = store.find_where(&KeyFilter::text(column, [value])).await?;
    if rows.iter().any(|row| row.get_id() != id) {
        return Err(CrudError::validation(format!(
            "{label} {column} '{value}' already exists"
        )));
    }
    Ok(())
}

/// Reject a reference to a row that does not exist.
pub(crate) async fn ensure_exists<S, E>(store: &S, id: i64, label: &str) -> CrudResult<()>
where
    S: First<E>,
    E: Entity,
{
    match store.first(id).await {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => {
            Err(CrudError::validation(format!("{label} {id} does not exist")))
        }
        Err(err) => Err(err.into()),
    }
}

/// Reject the operation while rows of `E` still point at `id`.
pub(crate) async fn ensure_no_dependents<S, E>(
    store: &S,
    column: &'static str,
    id: i64,
    message: String,
) -> CrudResult<()>
where
    S: FindWhere<E>,
    E: Entity,
{
    let rows = store.find_where(&KeyFilter::int(column, [id])).await?;
    if rows.is_empty() {
        Ok(())
    } else {
        Err(CrudError::Validation(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::test_utils::{program_input, seeded_store};
    use notes_core_api::{
        EndpointInput, EntityType, MemorySheetInput, ProjectInput, TagInput, TaggingInput,
        TaskInput, TaskStatus, WordInput,
    };

    #[tokio::test]
    async fn test_program_names_are_unique() {
        let store = MemoryStore::new_shared();
        let services = Services::new(store.clone());
        services.programs.create(&program_input("acme")).await.unwrap();

        let err = services.programs.create(&program_input("acme")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("already exists"));

        // renaming to its own name is fine
        let globex = services.programs.create(&program_input("globex")).await.unwrap();
        services
            .programs
            .update(&program_input("globex"), globex.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_program_with_endpoints_cannot_be_deleted() {
        let fixture = seeded_store().await;
        let services = Services::new(fixture.store.clone());

        let err = services.programs.delete(fixture.programs[0]).await.unwrap_err();
        assert!(err.is_validation());

        let removed = services.programs.delete(fixture.programs[1]).await.unwrap();
        assert_eq!(removed.name.as_str(), "globex");
    }

    #[tokio::test]
    async fn test_endpoint_needs_program() {
        let store = MemoryStore::new_shared();
        let services = Services::new(store.clone());

        let input = EndpointInput {
            program_id: 42,
            url: "https://acme.com/login".to_string(),
            ..Default::default()
        };
        let err = services.endpoints.create(&input).await.unwrap_err();
        assert_eq!(err.to_string(), "program 42 does not exist");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let store = MemoryStore::new_shared();
        let services = Services::new(store.clone());

        let err = services.words.create(&WordInput::default()).await.unwrap_err();
        assert!(err.is_validation());

        let long_title = MemorySheetInput {
            title: "t".repeat(101),
            content: String::new(),
        };
        assert!(services.memory_sheets.create(&long_title).await.unwrap_err().is_validation());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let fixture = seeded_store().await;
        let services = Services::new(fixture.store.clone());
        let [xss, recon] = fixture.tags;

        let duplicate = TaggingInput {
            tag_id: xss,
            reference_id: fixture.programs[0],
            reference_type: EntityType::Programs,
        };
        assert!(services.taggings.create(&duplicate).await.unwrap_err().is_validation());

        let unknown_tag = TaggingInput {
            tag_id: 999,
            ..duplicate.clone()
        };
        assert!(services.taggings.create(&unknown_tag).await.unwrap_err().is_validation());

        assert!(services.tags.delete(recon).await.unwrap_err().is_validation());

        let unused = services
            .tags
            .create(&TagInput {
                name: "idor".to_string(),
                color: Some("#ff0000".to_string()),
            })
            .await
            .unwrap();
        services.tags.delete(unused.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_project_with_tasks_cannot_be_deleted() {
        let fixture = seeded_store().await;
        let services = Services::new(fixture.store.clone());
        let [empty, busy, _] = fixture.projects;

        assert!(services.projects.delete(busy).await.unwrap_err().is_validation());
        services.projects.delete(empty).await.unwrap();
    }

    #[tokio::test]
    async fn test_task_project_handling() {
        let fixture = seeded_store().await;
        let services = Services::new(fixture.store.clone());
        let [_, busy, _] = fixture.projects;

        let orphan = TaskInput {
            project_id: Some(999),
            title: "triage".to_string(),
            ..Default::default()
        };
        assert!(services.tasks.create(&orphan).await.unwrap_err().is_validation());

        let task = services
            .tasks
            .create(&TaskInput {
                project_id: Some(busy),
                title: "triage".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        let detached = services
            .tasks
            .update(
                &TaskInput {
                    project_id: Some(0),
                    title: "triage".to_string(),
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
                task.id,
            )
            .await
            .unwrap();
        assert_eq!(detached.project_id, None);
        assert_eq!(detached.status, TaskStatus::Done);

        // omitted project id leaves the task where it is
        let same = services
            .tasks
            .update(
                &TaskInput {
                    title: "triage again".to_string(),
                    ..Default::default()
                },
                task.id,
            )
            .await
            .unwrap();
        assert_eq!(same.project_id, None);
        assert_eq!(same.title.as_str(), "triage again");
    }

    #[tokio::test]
    async fn test_optional_fields_clear_with_empty_string() {
        let store = MemoryStore::new_shared();
        let services = Services::new(store.clone());
        let project = services
            .projects
            .create(&ProjectInput {
                name: "bounty".to_string(),
                description: Some("q3".to_string()),
            })
            .await
            .unwrap();

        let cleared = services
            .projects
            .update(
                &ProjectInput {
                    name: "bounty".to_string(),
                    description: Some(String::new()),
                },
                project.id,
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert!(cleared.updated_at >= project.updated_at);
    }
}
