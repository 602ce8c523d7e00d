//! CLI command implementations

pub mod list;
pub mod status;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};

use fieldsync_core::config::Config;
use fieldsync_store::pool::DatabasePool;
use fieldsync_store::store::SqliteDataPointStore;

/// Opens (creating if needed) the local store at the configured path
pub async fn open_store(config: &Config) -> Result<Arc<SqliteDataPointStore>> {
    if let Some(parent) = config.database.path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create database directory")?;
    }
    let pool = DatabasePool::new(&config.database.path)
        .await
        .context("Failed to open database")?;
    Ok(Arc::new(SqliteDataPointStore::new(pool.pool().clone())))
}
