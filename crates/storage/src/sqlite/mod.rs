use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::{CatalogRepository, ProgressRepository, ResultRepository, Storage};

mod catalog_repo;
mod mapping;
mod migrate;
mod progress_repo;
mod result_repo;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One pool serving the catalog, progress and results tables.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

fn is_private_memory(url: &str) -> bool {
    url.contains(":memory:") && !url.contains("cache=shared")
}

impl SqliteRepository {
    /// Open a pool with foreign keys enforced and WAL journaling.
    ///
    /// A private `:memory:` database gets a single connection, since every
    /// extra connection would see its own empty database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` for a malformed URL or a failed connection.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let max_connections = if is_private_memory(database_url) {
            1
        } else {
            MAX_CONNECTIONS
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;
        debug!(max_connections, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// Bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Connect, migrate and hand out one repository for every table group.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let shared = Arc::new(repo);
        Ok(Self {
            catalog: Arc::clone(&shared) as Arc<dyn CatalogRepository>,
            progress: Arc::clone(&shared) as Arc<dyn ProgressRepository>,
            results: shared as Arc<dyn ResultRepository>,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_memory_urls_are_detected() {
        assert!(is_private_memory("sqlite::memory:"));
        assert!(!is_private_memory("sqlite:file:lit?mode=memory&cache=shared"));
        assert!(!is_private_memory("sqlite:///tmp/lit.sqlite3"));
    }

    #[tokio::test]
    async fn private_memory_database_keeps_its_schema() {
        let storage = Storage::sqlite("sqlite::memory:").await.unwrap();
        assert!(storage.catalog.list_authors().await.unwrap().is_empty());
    }
}
