//! SQLite pool setup and schema bootstrap
//!
//! One entry point per deployment shape: [`DatabasePool::new`] for the
//! on-disk store the CLI uses, [`DatabasePool::in_memory`] for tests. Both
//! apply the embedded schema before handing the pool out, so a pool in
//! callers' hands always has the full table set.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;

use crate::StoreError;

/// Schema applied on every connect; each statement is IF NOT EXISTS
const SCHEMA: &str = include_str!("migrations/20260815_initial.sql");

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection limit for the on-disk store
const MAX_CONNECTIONS: u32 = 5;

/// SQLite pool with the fieldsync schema applied
///
/// The schema declares no foreign keys: submissions must be able to outlive
/// the row upsert order within a merge transaction, and the orphan sweep is
/// the component responsible for cross-table consistency.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens (creating if needed) the on-disk store at `db_path`
    ///
    /// WAL journaling keeps `watch` resnapshot reads from blocking behind
    /// page-merge writers; synchronous NORMAL is sufficient under WAL.
    ///
    /// # Errors
    /// `StoreError::ConnectionFailed` if the file or its directory cannot be
    /// opened, `StoreError::MigrationFailed` if the schema cannot be applied.
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "cannot create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = Self::connect(options, MAX_CONNECTIONS).await?;
        tracing::info!(path = %db_path.display(), "Store opened");
        Ok(pool)
    }

    /// Opens a fresh in-memory store for tests
    ///
    /// Capped at one connection: an in-memory SQLite database lives and dies
    /// with its connection, so a second connection would see empty tables.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        Self::connect(options, 1).await
    }

    /// Returns the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        Ok(Self { pool })
    }
}
