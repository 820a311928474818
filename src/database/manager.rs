use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StorageBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::repository::Store;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA: &str = include_str!("schema.sql");

/// Opens the configured store and prepares its schema.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory store; data is lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::apply_schema(&pool).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connect(e.to_string()))?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Idempotent table bootstrap; every statement is `IF NOT EXISTS`.
    pub async fn apply_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in schema_statements(SCHEMA) {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }
}

fn schema_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn schema_splits_into_create_statements() {
        let statements: Vec<&str> = schema_statements(SCHEMA).collect();
        assert!(statements.len() >= 6);
        assert!(statements
            .iter()
            .all(|s| s.starts_with("CREATE TABLE IF NOT EXISTS") || s.starts_with("CREATE UNIQUE INDEX IF NOT EXISTS") || s.starts_with("CREATE INDEX IF NOT EXISTS")));
    }

    #[tokio::test]
    async fn postgres_without_url_is_config_error() {
        let mut config = AppConfig::production().database;
        config.url = None;
        assert!(matches!(
            DatabaseManager::connect(&config).await,
            Err(DatabaseError::ConfigMissing("DATABASE_URL"))
        ));
    }

    #[tokio::test]
    async fn memory_backend_opens_healthy_store() {
        let config = AppConfig::development().database;
        let store = DatabaseManager::open(&config).await.unwrap();
        assert!(store.health_check().await.is_ok());
    }
}
