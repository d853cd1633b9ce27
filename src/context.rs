//! App Context

use std::{fmt, sync::Arc};

use sqlx::{PgPool, migrate::MigrateError};
use thiserror::Error;

use crate::{
    changes::{ChangeFeed, PgChangeFeed},
    config::{AppConfig, StorageBackend},
    database,
    domain::{
        candidacies::{CandidaciesManager, CandidaciesService},
        elections::{ElectionsManager, ElectionsService},
        profiles::{ProfilesManager, ProfilesService, repository::PgProfilesRepository},
        results::{ResultsManager, ResultsService, export::FileExporter},
        users::{UsersManager, UsersService, repository::PgUsersRepository},
        votes::{VotingManager, VotingService},
    },
    scope::ViewScope,
    session::SessionManager,
    storage::{FileStore, KeyValueStore, MemoryStore},
};

/// Failures while building an [`AppContext`].
#[derive(Debug, Error)]
pub enum AppInitError {
    /// No database URL was given.
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    /// The pool could not connect.
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    /// Migrations failed to apply.
    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

/// Services every command runs against.
#[derive(Clone)]
pub struct AppContext {
    /// Election management and browsing.
    pub elections: Arc<dyn ElectionsService>,
    /// Candidacy management.
    pub candidacies: Arc<dyn CandidaciesService>,
    /// Vote casting.
    pub voting: Arc<dyn VotingService>,
    /// Tallies and exports.
    pub results: Arc<dyn ResultsService>,
    /// User management.
    pub users: Arc<dyn UsersService>,
    /// Personal profiles.
    pub profiles: Arc<dyn ProfilesService>,
    /// Login state.
    pub sessions: SessionManager,
    /// Row change notifications.
    pub changes: Arc<dyn ChangeFeed>,
    /// Cancellation and timeout for every request.
    pub scope: ViewScope,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("sessions", &self.sessions)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Connect to the configured database and wire up every service.
    ///
    /// # Errors
    ///
    /// Returns an error when no database URL is configured, the connection
    /// fails or migrations were requested and could not be applied.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let url = config
            .database
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(AppInitError::MissingDatabaseUrl)?;

        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if config.database.migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        let store: Arc<dyn KeyValueStore> = match config.runtime.storage {
            StorageBackend::File => Arc::new(FileStore::new(&config.runtime.session_file)),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(Self::from_pool(
            pool,
            store,
            FileExporter::new(&config.runtime.export_dir),
            ViewScope::new(config.runtime.request_timeout()),
        ))
    }

    /// Wire up services over an existing pool.
    #[must_use]
    pub fn from_pool(
        pool: PgPool,
        store: Arc<dyn KeyValueStore>,
        exporter: FileExporter,
        scope: ViewScope,
    ) -> Self {
        Self {
            elections: Arc::new(ElectionsManager::pg(pool.clone())),
            candidacies: Arc::new(CandidaciesManager::pg(pool.clone())),
            voting: Arc::new(VotingManager::pg(pool.clone())),
            results: Arc::new(ResultsManager::pg(pool.clone(), Arc::new(exporter))),
            users: Arc::new(UsersManager::pg(pool.clone())),
            profiles: Arc::new(ProfilesManager::pg(pool.clone())),
            sessions: SessionManager::new(
                Arc::new(PgUsersRepository::new(pool.clone())),
                Arc::new(PgProfilesRepository::new(pool.clone())),
                store,
            ),
            changes: Arc::new(PgChangeFeed::new(pool)),
            scope,
        }
    }
}
