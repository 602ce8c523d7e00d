//! Console sync listener
//!
//! Bridges the engine's lifecycle events to terminal output so an
//! operator can follow a run as pages land.

use std::sync::Arc;

use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{ISyncListener, SyncEvent};

use crate::output::OutputFormatter;

/// Prints sync lifecycle events through the active formatter
pub struct ConsoleSyncListener {
    formatter: Arc<dyn OutputFormatter>,
}

impl ConsoleSyncListener {
    pub fn new(formatter: Arc<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }
}

#[async_trait::async_trait]
impl ISyncListener for ConsoleSyncListener {
    async fn on_event(
        &self,
        survey_group_id: SurveyGroupId,
        event: SyncEvent,
    ) -> anyhow::Result<()> {
        match event {
            SyncEvent::Started => {
                self.formatter
                    .note(&format!("Syncing survey group {survey_group_id}..."));
            }
            SyncEvent::Progress { synced } => {
                self.formatter.note(&format!("  {synced} record(s) so far"));
            }
            SyncEvent::CompletedOk { synced } => {
                self.formatter
                    .success(&format!("Sync completed: {synced} record(s)"));
            }
            SyncEvent::CompletedCorrupt { synced } => {
                self.formatter.warn(&format!(
                    "Sync completed with corrupt records on the server ({synced} record(s) merged)"
                ));
            }
            SyncEvent::AssignmentRequired { message } => {
                self.formatter.error(&message);
            }
            SyncEvent::Failed { message } => {
                self.formatter.error(&format!("Sync failed: {message}"));
            }
        }
        Ok(())
    }

    async fn on_data_changed(&self) -> anyhow::Result<()> {
        // The terminal has no standing view to refresh
        Ok(())
    }
}
