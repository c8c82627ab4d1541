use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use notes_core_api::{ApiError, RequestContext, SecretLink};
use notes_core_db::cache::{CachedAliasStore, MokaKvCache};
use notes_core_db::loader::{Loaders, RequestScope};
use notes_core_db::service::Services;
use notes_core_db::StoreError;

use crate::config::{BackendConfig, ConfigError};
use crate::repository::db_init::init_database;
use crate::repository::PostgresStore;

/// Store every request-facing component works on: PostgreSQL with alias
/// lookups served from the key-value cache.
pub type NotesStore = CachedAliasStore<PostgresStore, MokaKvCache>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Process-wide backend state: the pool, the shared cache and the login
/// secret. Per-request state is created by `begin_request`.
pub struct PostgresBackend {
    config: BackendConfig,
    pool: Arc<PgPool>,
    store: Arc<NotesStore>,
    secret: SecretLink,
}

impl PostgresBackend {
    /// Connect the pool and create the schema if missing.
    pub async fn connect(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database_url)
            .await?;
        init_database(&pool).await?;
        info!(max_connections = config.max_connections, "database pool ready");
        Self::from_pool(pool, config)
    }

    /// Wrap an existing pool. The schema is assumed to exist.
    pub fn from_pool(pool: PgPool, config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        let secret = match &config.secret {
            Some(secret) => SecretLink::new(secret.clone())?,
            None => {
                let generated = SecretLink::generate();
                info!(login_url = %generated.login_url(&config.public_url), "generated login secret");
                generated
            }
        };

        let pool = Arc::new(pool);
        let cache = Arc::new(MokaKvCache::new(config.cache_capacity));
        let store = Arc::new(CachedAliasStore::with_ttl(
            Arc::new(PostgresStore::new(pool.clone())),
            cache,
            config.alias_cache_ttl(),
        ));

        Ok(Self {
            config,
            pool,
            store,
            secret,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }

    pub fn store(&self) -> &Arc<NotesStore> {
        &self.store
    }

    pub fn login_url(&self) -> String {
        self.secret.login_url(&self.config.public_url)
    }

    /// Typed CRUD services over the shared store.
    pub fn services(&self) -> Services<NotesStore> {
        Services::new(self.store.clone())
    }

    /// Build the context of one incoming request: its cancellation scope,
    /// the authentication outcome and a fresh loader registry.
    ///
    /// The caller cancels the scope (or holds its guard) when the request
    /// ends so that loads still in flight are released.
    pub fn begin_request(&self, cookie: Option<&str>, header: Option<&str>) -> RequestContext {
        let mut ctx = RequestContext::new();
        let scope = RequestScope::new();
        ctx.insert(self.secret.authenticate(cookie, header));
        ctx.insert(scope.clone());

        let loaders = Loaders::with_config(self.store.clone(), scope, self.config.loader_config());
        Loaders::attach_to_context(&mut ctx, loaders);
        ctx
    }
}

impl std::fmt::Debug for PostgresBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBackend")
            .field("config", &self.config)
            .field("secret", &self.secret)
            .finish()
    }
}
