//! fieldsync-store - Local record persistence
//!
//! SQLite-based store for:
//! - Data points and their submissions
//! - Per-survey-group sync watermarks
//! - Reactive queries (full resnapshot on write)
//!
//! ## Architecture
//!
//! This crate implements the `IDataPointStore` port from `fieldsync-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with schema bootstrap
//! - [`SqliteDataPointStore`] - Full `IDataPointStore` implementation
//! - [`ChangeNotifier`] - Write-through invalidation for reactive queries
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use fieldsync_store::{DatabasePool, SqliteDataPointStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/fieldsync/fieldsync.db")).await?;
//! let store = SqliteDataPointStore::new(pool.pool().clone());
//! // Use store as IDataPointStore...
//! # Ok(())
//! # }
//! ```

pub mod notifier;
pub mod pool;
pub mod store;

pub use notifier::ChangeNotifier;
pub use pool::DatabasePool;
pub use store::SqliteDataPointStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be mapped back to a domain entity
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
