use std::sync::Arc;

use tracing::{debug, info, instrument};

use notes_core_api::EntityType;

use crate::models::entity::Entity;
use crate::models::identifiable::Identifiable;
use crate::repository::{
    AliasStore, Create, EntityStore, Page, PageRequest, TransactionHandle, Transactional,
};

use super::error::{CrudError, CrudResult};
use super::hooks::CrudHooks;

/// Create, read, update and delete of one entity type.
///
/// Every mutation validates first and then issues exactly one write; a
/// rejected operation writes nothing. Store failures are returned as they
/// are, without retry.
pub struct GenericCrud<S, H> {
    store: Arc<S>,
    hooks: H,
}

impl<S, H> GenericCrud<S, H>
where
    S: EntityStore<H::Entity> + AliasStore + Transactional + 'static,
    H: CrudHooks<S>,
{
    pub fn new(store: Arc<S>, hooks: H) -> Self {
        Self { store, hooks }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn table(&self) -> &'static str {
        <H::Entity as Entity>::TABLE
    }

    fn entity_type(&self) -> CrudResult<EntityType> {
        <H::Entity as Entity>::ENTITY_TYPE
            .ok_or_else(|| CrudError::validation(format!("{} cannot carry an alias", self.table())))
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn create(&self, input: &H::Input) -> CrudResult<H::Entity> {
        self.hooks.validate_write(&*self.store, input, 0).await?;
        let entity = self.hooks.transform(input)?;

        let created = self.store.create(entity).await?;
        info!(entity = self.table(), id = created.get_id(), "created");
        Ok(created)
    }

    /// Create the row and bind `alias` to it in one transaction. Either both
    /// are stored or neither is.
    #[instrument(level = "debug", skip(self, input))]
    pub async fn create_with_alias(&self, input: &H::Input, alias: &str) -> CrudResult<H::Entity>
    where
        S::Tx: Create<H::Entity> + AliasStore,
    {
        let entity_type = self.entity_type()?;
        self.hooks.validate_write(&*self.store, input, 0).await?;
        let entity = self.hooks.transform(input)?;

        // dropping the handle on an early return rolls back
        let tx = self.store.begin().await?;
        let created = tx.create(entity).await?;
        tx.set_alias(entity_type, created.get_id(), alias).await?;
        tx.commit().await?;

        info!(entity = self.table(), id = created.get_id(), alias, "created with alias");
        Ok(created)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: i64) -> CrudResult<H::Entity> {
        Ok(self.store.first(id).await?)
    }

    pub async fn get_by_alias(&self, alias: &str) -> CrudResult<H::Entity> {
        let id = self.resolve(alias).await?;
        self.get(id).await
    }

    pub async fn list(&self, page: PageRequest) -> CrudResult<Page<H::Entity>> {
        Ok(self.store.list(page).await?)
    }

    #[instrument(level = "debug", skip(self, input))]
    pub async fn update(&self, input: &H::Input, id: i64) -> CrudResult<H::Entity> {
        let existing = self.store.first(id).await?;
        self.hooks.validate_write(&*self.store, input, id).await?;

        let changes = self.hooks.compute_updates(&existing, input)?;
        if changes.is_empty() {
            debug!(entity = self.table(), id, "nothing to update");
            return Ok(existing);
        }

        let updated = self.store.updates(id, &changes).await?;
        info!(
            entity = self.table(),
            id,
            columns = ?changes.keys().collect::<Vec<_>>(),
            "updated"
        );
        Ok(updated)
    }

    pub async fn update_by_alias(&self, input: &H::Input, alias: &str) -> CrudResult<H::Entity> {
        let id = self.resolve(alias).await?;
        self.update(input, id).await
    }

    /// Remove the row, returning its last state.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: i64) -> CrudResult<H::Entity> {
        let existing = self.store.first(id).await?;
        self.hooks.validate_delete(&*self.store, &existing).await?;

        let deleted = self.store.delete(id).await?;
        info!(entity = self.table(), id, "deleted");
        Ok(deleted)
    }

    pub async fn delete_by_alias(&self, alias: &str) -> CrudResult<H::Entity> {
        let id = self.resolve(alias).await?;
        self.delete(id).await
    }

    /// Bind `alias` to an existing row, replacing its previous alias. An
    /// empty alias changes nothing.
    pub async fn set_alias(&self, id: i64, alias: &str) -> CrudResult<()> {
        let entity_type = self.entity_type()?;
        let _: H::Entity = self.store.first(id).await?;
        self.store.set_alias(entity_type, id, alias).await?;
        Ok(())
    }

    /// Id of the row `alias` names. An alias bound to another entity type
    /// does not name a row of this one.
    async fn resolve(&self, alias: &str) -> CrudResult<i64> {
        let (id, entity_type) = self.store.resolve(alias).await.map_err(|err| {
            if err.is_not_found() {
                CrudError::not_found(self.table(), alias)
            } else {
                CrudError::from(err)
            }
        })?;

        match <H::Entity as Entity>::ENTITY_TYPE {
            Some(expected) if expected == entity_type => Ok(id),
            _ => Err(CrudError::not_found(self.table(), alias)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StoreCall};
    use crate::models::ProgramModel;
    use crate::service::{ProgramHooks, Services};
    use crate::test_utils::{program_input, seeded_store};
    use notes_core_api::{ProgramInput, WordInput};

    fn programs(store: &Arc<MemoryStore>) -> GenericCrud<MemoryStore, ProgramHooks> {
        GenericCrud::new(store.clone(), ProgramHooks)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);

        let created = crud.create(&program_input("acme")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.platform.as_deref(), Some("hackerone"));

        let loaded = crud.get(created.id).await.unwrap();
        assert_eq!(loaded, created);
        assert!(crud.get(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_validation_writes_nothing() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);

        let invalid = ProgramInput {
            name: String::new(),
            ..Default::default()
        };
        let err = crud.create(&invalid).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.write_count(), 0);
        assert!(!store
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Create { .. })));
    }

    #[tokio::test]
    async fn test_empty_update_writes_nothing() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);
        let created = crud.create(&program_input("acme")).await.unwrap();
        store.clear_calls();

        // same values, and None for every optional column
        let unchanged = ProgramInput {
            name: "acme".to_string(),
            ..Default::default()
        };
        let result = crud.update(&unchanged, created.id).await.unwrap();

        assert_eq!(result, created);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);
        let created = crud.create(&program_input("acme")).await.unwrap();
        store.clear_calls();

        let input = ProgramInput {
            name: "acme".to_string(),
            scope: Some("*.acme.com".to_string()),
            ..Default::default()
        };
        let updated = crud.update(&input, created.id).await.unwrap();

        assert_eq!(updated.scope.as_deref(), Some("*.acme.com"));
        assert_eq!(updated.platform, created.platform);
        let writes: Vec<StoreCall> = store.calls().into_iter().filter(StoreCall::is_write).collect();
        assert_eq!(
            writes,
            vec![StoreCall::Updates {
                table: "program",
                id: created.id,
                columns: vec!["scope", "updated_at"],
            }]
        );
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);
        let err = crud.update(&program_input("acme"), 7).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_returns_last_state() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);
        let created = crud.create(&program_input("acme")).await.unwrap();

        let deleted = crud.delete(created.id).await.unwrap();
        assert_eq!(deleted, created);
        assert!(crud.get(created.id).await.unwrap_err().is_not_found());
        assert!(crud.delete(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_alias_operations() {
        let fixture = seeded_store().await;
        let crud = programs(&fixture.store);

        let acme = crud.get_by_alias("acme-h1").await.unwrap();
        assert_eq!(acme.id, fixture.programs[0]);

        let input = ProgramInput {
            name: "acme".to_string(),
            description: Some("main target".to_string()),
            ..Default::default()
        };
        let updated = crud.update_by_alias(&input, "acme-h1").await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("main target"));

        assert!(crud.get_by_alias("nope").await.unwrap_err().is_not_found());

        crud.set_alias(fixture.programs[1], "globex-bc").await.unwrap();
        let removed = crud.delete_by_alias("globex-bc").await.unwrap();
        assert_eq!(removed.id, fixture.programs[1]);
    }

    #[tokio::test]
    async fn test_alias_of_another_type_is_not_found() {
        let fixture = seeded_store().await;
        let services = Services::new(fixture.store.clone());
        let word = services
            .words
            .create_with_alias(
                &WordInput {
                    value: "payload".to_string(),
                    definition: None,
                },
                "xss-payload",
            )
            .await
            .unwrap();

        assert_eq!(services.words.get_by_alias("xss-payload").await.unwrap(), word);
        let err = services.programs.get_by_alias("xss-payload").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_alias_is_ignored() {
        let fixture = seeded_store().await;
        let crud = programs(&fixture.store);
        fixture.store.clear_calls();

        crud.set_alias(fixture.programs[1], "").await.unwrap();
        assert_eq!(fixture.store.write_count(), 0);
        assert!(crud.get_by_alias("").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_with_alias_rolls_back_on_conflict() {
        let fixture = seeded_store().await;
        let crud = programs(&fixture.store);
        fixture.store.clear_calls();

        let err = crud
            .create_with_alias(&program_input("initech"), "acme-h1")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let page = crud.list(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|p: &ProgramModel| p.name.as_str() != "initech"));
        assert!(!fixture
            .store
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Commit)));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let store = MemoryStore::new_shared();
        let crud = programs(&store);
        store.fail_writes(Some("disk full"));

        let err = crud.create(&program_input("acme")).await.unwrap_err();
        assert!(matches!(err, CrudError::Store(_)));
        let calls = store
            .calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Create { .. }))
            .count();
        assert_eq!(calls, 1);
    }
}
