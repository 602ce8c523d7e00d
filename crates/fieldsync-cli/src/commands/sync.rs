//! Sync command - Pull remote data points into the local store
//!
//! Provides the `fieldsync sync` CLI command which:
//! 1. Loads configuration and opens the database
//! 2. Creates the REST adapter against the configured server
//! 3. Runs one orchestrated sync pass for the survey group
//! 4. Streams lifecycle events to the terminal; Ctrl-C stops cleanly
//!    between pages

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fieldsync_api::client::RestClient;
use fieldsync_api::datasource::RestRemoteDataSource;
use fieldsync_core::config::Config;
use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{IDataPointStore, IRemoteDataSource, ISyncListener};
use fieldsync_engine::engine::SyncEngine;
use fieldsync_engine::orchestrator::SyncOrchestrator;

use crate::listener::ConsoleSyncListener;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Survey group to synchronize
    pub survey_group: i64,
}

impl SyncCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = format.formatter();
        let group = SurveyGroupId::new(self.survey_group);

        let store = super::open_store(config).await?;
        let store_port: Arc<dyn IDataPointStore> = store;

        let client = RestClient::with_base_url(
            config.api.api_key.clone(),
            config.api.base_url.clone(),
        );
        let remote: Arc<dyn IRemoteDataSource> = Arc::new(RestRemoteDataSource::new(client));

        let listener: Arc<dyn ISyncListener> =
            Arc::new(ConsoleSyncListener::new(Arc::from(format.formatter())));

        let engine = Arc::new(SyncEngine::new(remote, Arc::clone(&store_port), config));
        let orchestrator = SyncOrchestrator::new(engine, store_port, listener);

        // Ctrl-C cancels between pages; merged pages stay committed
        let cancel = CancellationToken::new();
        let ctrl_c_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current page");
                ctrl_c_cancel.cancel();
            }
        });

        match orchestrator.start_sync(group, cancel).await {
            Ok(summary) => {
                if format.is_json() {
                    formatter.json(&serde_json::json!({
                        "survey_group": self.survey_group,
                        "synced": summary.synced,
                        "corrupt": summary.corruption_observed,
                        "cancelled": summary.cancelled,
                    }));
                }
                Ok(())
            }
            Err(err) => {
                // The listener already reported the terminal event
                Err(err).context("Synchronization aborted")
            }
        }
    }
}
