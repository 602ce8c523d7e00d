//! Run lifecycle orchestration
//!
//! Wraps the page-polling engine with everything one synchronization run
//! needs around it: per-group serialization, the listener event sequence,
//! error-to-event mapping, the unconditional post-run orphan sweep, and
//! the data-changed broadcast.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{IDataPointStore, ISyncListener, SyncEvent};

use crate::engine::{SyncEngine, SyncRunSummary};
use crate::SyncError;

/// Buffered page reports between the engine task and the event loop
const PROGRESS_CAPACITY: usize = 16;

// ============================================================================
// SyncOrchestrator
// ============================================================================

/// Drives sync runs and fans their lifecycle out to the listener
///
/// Runs for the same survey group are serialized through a per-group
/// lock: a second request for a group whose run is in flight waits its
/// turn rather than starting a concurrent run. Runs for different
/// groups proceed independently.
pub struct SyncOrchestrator {
    engine: Arc<SyncEngine>,
    store: Arc<dyn IDataPointStore>,
    listener: Arc<dyn ISyncListener>,
    run_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl SyncOrchestrator {
    pub fn new(
        engine: Arc<SyncEngine>,
        store: Arc<dyn IDataPointStore>,
        listener: Arc<dyn ISyncListener>,
    ) -> Self {
        Self {
            engine,
            store,
            listener,
            run_locks: DashMap::new(),
        }
    }

    /// Runs one synchronization pass for a survey group, end to end
    ///
    /// Emits `Started`, a `Progress` event per merged page, and exactly
    /// one terminal event. After the run, whatever its outcome, sweeps
    /// submission-less records and broadcasts the data-changed signal:
    /// pages merged before an abort are committed, so consumers must
    /// refresh even after a failure.
    ///
    /// Cancelled runs end cleanly with a normal completion event.
    #[instrument(skip(self, cancel), fields(group = %survey_group_id))]
    pub async fn start_sync(
        &self,
        survey_group_id: SurveyGroupId,
        cancel: CancellationToken,
    ) -> Result<SyncRunSummary, SyncError> {
        let lock = self.run_lock(survey_group_id);
        let _guard = lock.lock().await;

        info!(group = %survey_group_id, "Sync run starting");
        self.emit(survey_group_id, SyncEvent::Started).await;

        let (tx, mut rx) = mpsc::channel(PROGRESS_CAPACITY);
        let engine = Arc::clone(&self.engine);
        let run_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            engine.run(survey_group_id, tx, &run_cancel).await
        });

        let mut synced: u64 = 0;
        while let Some(page) = rx.recv().await {
            synced += page.merged_count as u64;
            self.emit(survey_group_id, SyncEvent::Progress { synced })
                .await;
        }

        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(SyncError::Internal(format!(
                "sync task aborted: {join_err}"
            ))),
        };

        let terminal = match &result {
            Ok(summary) if summary.corruption_observed => SyncEvent::CompletedCorrupt {
                synced: summary.synced,
            },
            Ok(summary) => SyncEvent::CompletedOk {
                synced: summary.synced,
            },
            Err(err @ SyncError::AssignmentRequired(_)) => SyncEvent::AssignmentRequired {
                message: err.to_string(),
            },
            Err(err) => SyncEvent::Failed {
                message: err.to_string(),
            },
        };
        self.emit(survey_group_id, terminal).await;

        // Consistency sweep and refresh broadcast run after every outcome
        match self.store.remove_orphans().await {
            Ok(removed) if removed > 0 => {
                info!(removed, "Swept submission-less records");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Orphan sweep failed"),
        }
        if let Err(err) = self.listener.on_data_changed().await {
            warn!(error = %err, "Listener rejected data-changed broadcast");
        }

        match &result {
            Ok(summary) => info!(
                group = %survey_group_id,
                synced = summary.synced,
                corrupt = summary.corruption_observed,
                cancelled = summary.cancelled,
                "Sync run finished"
            ),
            Err(err) => warn!(group = %survey_group_id, error = %err, "Sync run aborted"),
        }

        result
    }

    fn run_lock(&self, survey_group_id: SurveyGroupId) -> Arc<Mutex<()>> {
        self.run_locks
            .entry(survey_group_id.as_i64())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn emit(&self, survey_group_id: SurveyGroupId, event: SyncEvent) {
        if let Err(err) = self.listener.on_event(survey_group_id, event).await {
            warn!(error = %err, "Listener rejected sync event");
        }
    }
}
