use std::sync::Arc;

use ozunlu_core::config::{AppConfig, ConfigError, StorageBackend};
use ozunlu_db::{
    connect_with_config, migrations, DbPool, InMemoryQuoteRepository, QuoteRepository,
    RepositoryError, SqlQuoteRepository,
};
use thiserror::Error;
use tracing::info;

use crate::intake::QuoteIntake;

pub struct Application {
    pub config: AppConfig,
    pub intake: Arc<QuoteIntake>,
    /// Present only for the sqlite backend.
    pub db_pool: Option<DbPool>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("quote store could not be read: {0}")]
    Repository(#[source] RepositoryError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        quote_id = "unknown",
        storage_backend = ?config.storage.backend,
        "starting application bootstrap"
    );

    let (repository, db_pool): (Arc<dyn QuoteRepository>, Option<DbPool>) =
        match config.storage.backend {
            StorageBackend::Memory => (Arc::new(InMemoryQuoteRepository::default()), None),
            StorageBackend::Sqlite => {
                let pool = connect_with_config(&config.database)
                    .await
                    .map_err(BootstrapError::DatabaseConnect)?;
                info!(
                    event_name = "system.bootstrap.database_connected",
                    correlation_id = "bootstrap",
                    quote_id = "unknown",
                    "database connection established"
                );

                migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
                info!(
                    event_name = "system.bootstrap.migrations_applied",
                    correlation_id = "bootstrap",
                    quote_id = "unknown",
                    "database migrations applied"
                );
                (Arc::new(SqlQuoteRepository::new(pool.clone())), Some(pool))
            }
        };

    let intake = QuoteIntake::resume(repository).await.map_err(BootstrapError::Repository)?;
    Ok(Application { config, intake: Arc::new(intake), db_pool })
}
