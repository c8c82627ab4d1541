use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use notes_core_api::RequestContext;

use crate::models::entity::Entity;
use crate::models::{
    AliasModel, EndpointModel, MemorySheetModel, ProgramModel, ProjectModel, TagModel,
    TaggingModel, TaskModel, WordModel,
};
use crate::repository::FindWhere;

use super::batch_fn::BatchFn;
use super::config::LoaderConfig;
use super::dataloader::Loader;
use super::eager::HasMany;
use super::error::LoadError;
use super::key::ReferenceKey;
use super::reader::{EntityReader, RelationReader, TagsByReferenceReader};
use super::scope::RequestScope;

/// Stores every loader of the registry can read from.
pub trait LoaderStore:
    FindWhere<ProgramModel>
    + FindWhere<EndpointModel>
    + FindWhere<TagModel>
    + FindWhere<TaggingModel>
    + FindWhere<WordModel>
    + FindWhere<ProjectModel>
    + FindWhere<TaskModel>
    + FindWhere<MemorySheetModel>
    + FindWhere<AliasModel>
    + 'static
{
}

impl<S> LoaderStore for S where
    S: FindWhere<ProgramModel>
        + FindWhere<EndpointModel>
        + FindWhere<TagModel>
        + FindWhere<TaggingModel>
        + FindWhere<WordModel>
        + FindWhere<ProjectModel>
        + FindWhere<TaskModel>
        + FindWhere<MemorySheetModel>
        + FindWhere<AliasModel>
        + 'static
{
}

/// The loaders of one request.
///
/// Built fresh for every inbound request and dropped with it; never shared
/// between requests.
pub struct Loaders<S> {
    scope: RequestScope,
    store: Arc<S>,

    pub programs: Loader<i64, Option<ProgramModel>>,
    /// Programs with their endpoints preloaded
    pub programs_with_endpoints: Loader<i64, Option<ProgramModel>>,
    pub endpoints: Loader<i64, Option<EndpointModel>>,
    /// Endpoints keyed by program id
    pub endpoints_by_program: Loader<i64, Vec<EndpointModel>>,
    pub tags: Loader<i64, Option<TagModel>>,
    pub tags_by_reference: Loader<ReferenceKey, Vec<TagModel>>,
    pub words: Loader<i64, Option<WordModel>>,
    pub projects: Loader<i64, Option<ProjectModel>>,
    /// Projects with their tasks preloaded
    pub projects_with_tasks: Loader<i64, Option<ProjectModel>>,
    pub tasks: Loader<i64, Option<TaskModel>>,
    /// Tasks keyed by project id, newest first
    pub tasks_by_project: Loader<i64, Vec<TaskModel>>,
    pub memory_sheets: Loader<i64, Option<MemorySheetModel>>,
    pub aliases_by_reference: Loader<ReferenceKey, Option<AliasModel>>,
}

fn endpoints_of_program() -> HasMany<ProgramModel, EndpointModel> {
    HasMany {
        path: "endpoints",
        foreign_key: "program_id",
        parent_key: |program| program.id,
        child_key: |endpoint| Some(endpoint.program_id),
        attach: |program, endpoints| program.endpoints = Some(endpoints),
    }
}

fn by_id<S, E>(store: &Arc<S>) -> Arc<dyn BatchFn<i64, Option<E>>>
where
    S: FindWhere<E> + 'static,
    E: Entity,
{
    Arc::new(EntityReader::by_id(store.clone()))
}

fn tasks_of_project() -> HasMany<ProjectModel, TaskModel> {
    HasMany {
        path: "tasks",
        foreign_key: "project_id",
        parent_key: |project| project.id,
        child_key: |task| task.project_id,
        attach: |project, tasks| project.tasks = Some(tasks),
    }
}

impl<S: LoaderStore> Loaders<S> {
    pub fn new(store: Arc<S>, scope: RequestScope) -> Self {
        Self::with_config(store, scope, LoaderConfig::default())
    }

    pub fn with_config(store: Arc<S>, scope: RequestScope, config: LoaderConfig) -> Self {
        let tasks_newest_first: fn(&TaskModel, &TaskModel) -> Ordering =
            |a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id));

        let programs_with_endpoints =
            EntityReader::<S, ProgramModel, i64>::by_id(store.clone()).with(endpoints_of_program());
        let projects_with_tasks =
            EntityReader::<S, ProjectModel, i64>::by_id(store.clone()).with(tasks_of_project());
        let endpoints_by_program = RelationReader::<S, EndpointModel, i64>::new(
            store.clone(),
            "program_id",
            |endpoint| Some(endpoint.program_id),
        );
        let tasks_by_project =
            RelationReader::<S, TaskModel, i64>::new(store.clone(), "project_id", |task| task.project_id)
                .ordered_by(tasks_newest_first);
        let aliases_by_reference = EntityReader::<S, AliasModel, ReferenceKey>::new(
            store.clone(),
            ("reference_id", "reference_type"),
            |alias| Some(ReferenceKey::new(alias.reference_type, alias.reference_id)),
        );

        Self {
            programs: Loader::new("programs", by_id(&store), config, scope.clone()),
            programs_with_endpoints: Loader::new(
                "programs_with_endpoints",
                Arc::new(programs_with_endpoints),
                config,
                scope.clone(),
            ),
            endpoints: Loader::new("endpoints", by_id(&store), config, scope.clone()),
            endpoints_by_program: Loader::new(
                "endpoints_by_program",
                Arc::new(endpoints_by_program),
                config,
                scope.clone(),
            ),
            tags: Loader::new("tags", by_id(&store), config, scope.clone()),
            tags_by_reference: Loader::new(
                "tags_by_reference",
                Arc::new(TagsByReferenceReader::new(store.clone())),
                config,
                scope.clone(),
            ),
            words: Loader::new("words", by_id(&store), config, scope.clone()),
            projects: Loader::new("projects", by_id(&store), config, scope.clone()),
            projects_with_tasks: Loader::new(
                "projects_with_tasks",
                Arc::new(projects_with_tasks),
                config,
                scope.clone(),
            ),
            tasks: Loader::new("tasks", by_id(&store), config, scope.clone()),
            tasks_by_project: Loader::new(
                "tasks_by_project",
                Arc::new(tasks_by_project),
                config,
                scope.clone(),
            ),
            memory_sheets: Loader::new("memory_sheets", by_id(&store), config, scope.clone()),
            aliases_by_reference: Loader::new(
                "aliases_by_reference",
                Arc::new(aliases_by_reference),
                config,
                scope.clone(),
            ),
            store,
            scope,
        }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Names of every loader in the registry.
    pub fn names(&self) -> Vec<&'static str> {
        vec![
            self.programs.name(),
            self.programs_with_endpoints.name(),
            self.endpoints.name(),
            self.endpoints_by_program.name(),
            self.tags.name(),
            self.tags_by_reference.name(),
            self.words.name(),
            self.projects.name(),
            self.projects_with_tasks.name(),
            self.tasks.name(),
            self.tasks_by_project.name(),
            self.memory_sheets.name(),
            self.aliases_by_reference.name(),
        ]
    }

    /// Execute every loader's open batch; the end-of-pass flush.
    ///
    /// All loaders are flushed even if one fails. The first failure is
    /// returned; waiters of every batch receive their own outcome either way.
    pub async fn dispatch_all(&self) -> Result<(), LoadError> {
        debug!(request_id = %self.scope.id(), "dispatching all loaders");
        let results = tokio::join!(
            self.programs.dispatch(),
            self.programs_with_endpoints.dispatch(),
            self.endpoints.dispatch(),
            self.endpoints_by_program.dispatch(),
            self.tags.dispatch(),
            self.tags_by_reference.dispatch(),
            self.words.dispatch(),
            self.projects.dispatch(),
            self.projects_with_tasks.dispatch(),
            self.tasks.dispatch(),
            self.tasks_by_project.dispatch(),
            self.memory_sheets.dispatch(),
            self.aliases_by_reference.dispatch(),
        );
        let (a, b, c, d, e, f, g, h, i, j, k, l, m) = results;
        [a, b, c, d, e, f, g, h, i, j, k, l, m].into_iter().collect()
    }

    /// Put the registry into the request context.
    pub fn attach_to_context(ctx: &mut RequestContext, loaders: Self) {
        ctx.insert(Arc::new(loaders));
    }

    /// Registry of the request.
    ///
    /// # Panics
    /// If no registry was attached: the request setup was skipped.
    pub fn from_context(ctx: &RequestContext) -> Arc<Self> {
        match Self::try_from_context(ctx) {
            Some(loaders) => loaders,
            None => panic!("no loader registry attached to the request context"),
        }
    }

    pub fn try_from_context(ctx: &RequestContext) -> Option<Arc<Self>> {
        ctx.get::<Arc<Self>>().cloned()
    }
}
