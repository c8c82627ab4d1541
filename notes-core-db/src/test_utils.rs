//! Fixtures shared by the unit tests.

use std::sync::Arc;

use notes_core_api::{
    EndpointInput, EntityType, ProgramInput, ProjectInput, TagInput, TaggingInput, TaskInput,
    WordInput,
};

use crate::memory::MemoryStore;
use crate::service::Services;

pub(crate) fn program_input(name: &str) -> ProgramInput {
    ProgramInput {
        name: name.to_string(),
        platform: Some("hackerone".to_string()),
        ..Default::default()
    }
}

/// Store seeded with a small notes graph.
pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    /// "acme" (two endpoints, alias "acme-h1", tagged recon and xss) and
    /// "globex" (nothing attached)
    pub programs: [i64; 2],
    /// no tasks, two tasks, one task
    pub projects: [i64; 3],
    /// "xss", "recon"
    pub tags: [i64; 2],
}

pub(crate) async fn seeded_store() -> Fixture {
    let store = MemoryStore::new_shared();
    let services = Services::new(store.clone());

    let acme = services
        .programs
        .create_with_alias(&program_input("acme"), "acme-h1")
        .await
        .unwrap();
    let globex = services.programs.create(&program_input("globex")).await.unwrap();
    for path in ["/login", "/api/v1/users"] {
        services
            .endpoints
            .create(&EndpointInput {
                program_id: acme.id,
                url: format!("https://acme.com{path}"),
                method: Some("GET".to_string()),
                description: None,
            })
            .await
            .unwrap();
    }

    let mut projects = [0; 3];
    for (slot, name) in projects.iter_mut().zip(["empty", "busy", "small"]) {
        *slot = services
            .projects
            .create(&ProjectInput {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id;
    }
    for (project, title) in [(projects[1], "recon"), (projects[1], "report"), (projects[2], "retest")] {
        services
            .tasks
            .create(&TaskInput {
                project_id: Some(project),
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let mut tags = [0; 2];
    for (slot, name) in tags.iter_mut().zip(["xss", "recon"]) {
        *slot = services
            .tags
            .create(&TagInput {
                name: name.to_string(),
                color: None,
            })
            .await
            .unwrap()
            .id;
    }
    for tag_id in [tags[1], tags[0]] {
        services
            .taggings
            .create(&TaggingInput {
                tag_id,
                reference_id: acme.id,
                reference_type: EntityType::Programs,
            })
            .await
            .unwrap();
    }

    services
        .words
        .create(&WordInput {
            value: "hello".to_string(),
            definition: None,
        })
        .await
        .unwrap();

    Fixture {
        store,
        programs: [acme.id, globex.id],
        projects,
        tags,
    }
}
