use chrono::Utc;
use heapless::String as HeaplessString;

use notes_core_api::{EntityType, TaskStatus};
use notes_core_db::{
    Create, EndpointModel, MemorySheetModel, ProgramModel, ProjectModel, StoreResult, TagModel,
    TaggingModel, TaskModel, WordModel,
};

use super::PostgresStore;

fn bounded<const N: usize>(value: &str) -> HeaplessString<N> {
    HeaplessString::try_from(value).unwrap()
}

pub fn program(name: &str) -> ProgramModel {
    let now = Utc::now();
    ProgramModel {
        id: 0,
        name: bounded(name),
        platform: Some(bounded("hackerone")),
        url: Some(format!("https://hackerone.com/{name}")),
        scope: None,
        description: Some(format!("{name} program")),
        created_at: now,
        updated_at: now,
        endpoints: None,
    }
}

pub fn endpoint(program_id: i64, url: &str) -> EndpointModel {
    let now = Utc::now();
    EndpointModel {
        id: 0,
        program_id,
        url: url.to_string(),
        method: Some(bounded("GET")),
        description: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn tag(name: &str) -> TagModel {
    TagModel {
        id: 0,
        name: bounded(name),
        color: None,
        created_at: Utc::now(),
    }
}

pub fn word(value: &str) -> WordModel {
    let now = Utc::now();
    WordModel {
        id: 0,
        value: bounded(value),
        definition: None,
        created_at: now,
        updated_at: now,
    }
}

pub struct Seeded {
    pub acme: ProgramModel,
    pub globex: ProgramModel,
    pub tag: TagModel,
    pub word: WordModel,
    pub project: ProjectModel,
    pub task: TaskModel,
    pub sheet: MemorySheetModel,
}

/// Two programs (acme with two endpoints and one tag), a word, a project
/// with one task, and a memory sheet.
pub async fn seed(store: &PostgresStore) -> StoreResult<Seeded> {
    let now = Utc::now();
    let acme = store.create(program("acme")).await?;
    let globex = store.create(program("globex")).await?;
    store.create(endpoint(acme.id, "https://acme.com/login")).await?;
    store.create(endpoint(acme.id, "https://acme.com/api")).await?;

    let tag = store.create(tag("recon")).await?;
    store
        .create(TaggingModel {
            id: 0,
            tag_id: tag.id,
            reference_id: acme.id,
            reference_type: EntityType::Programs,
            created_at: now,
        })
        .await?;

    let word = store.create(word("hello")).await?;
    let project = store
        .create(ProjectModel {
            id: 0,
            name: bounded("audit"),
            description: None,
            created_at: now,
            updated_at: now,
            tasks: None,
        })
        .await?;
    let task = store
        .create(TaskModel {
            id: 0,
            project_id: Some(project.id),
            title: bounded("map the attack surface"),
            description: None,
            status: TaskStatus::Todo,
            due_at: Some(now),
            created_at: now,
            updated_at: now,
        })
        .await?;
    let sheet = store
        .create(MemorySheetModel {
            id: 0,
            title: bounded("sqli"),
            content: "' OR 1=1 --".to_string(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(Seeded {
        acme,
        globex,
        tag,
        word,
        project,
        task,
        sheet,
    })
}
