//! Incremental page-polling engine
//!
//! Pulls the paginated data point feed for one survey group and merges
//! each page into the local store, advancing the per-group watermark as
//! pages commit.
//!
//! ## Sync Flow
//!
//! 1. Read the committed watermark from the store
//! 2. Fetch one page newer than the watermark (never more than one fetch
//!    in flight)
//! 3. Drop records already merged from the immediately preceding page
//!    (the server's window is inclusive at the boundary timestamp)
//! 4. If nothing survives the drop, the group is caught up: stop
//! 5. Merge the survivors transactionally, report progress, wait a fixed
//!    delay, repeat
//!
//! A failed fetch or merge aborts the run immediately. The watermark is
//! only ever advanced inside a committed merge, so an aborted run loses
//! at most the page in flight and the next run resumes behind it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use fieldsync_core::config::Config;
use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{IDataPointStore, IRemoteDataSource, RemoteDataPoint};

use crate::SyncError;

// ============================================================================
// Run reporting types
// ============================================================================

/// Outcome of merging a single fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageResult {
    /// Records merged from this page after duplicate suppression
    pub merged_count: usize,
    /// Whether any record on the fetched page arrived without submissions
    pub is_corrupt: bool,
}

/// Outcome of a completed synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncRunSummary {
    /// Total records merged across all pages of the run
    pub synced: u64,
    /// Whether any page of the run carried a submission-less record
    pub corruption_observed: bool,
    /// Whether the run stopped early because it was cancelled
    pub cancelled: bool,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Fetch→dedup→merge poll loop over the remote feed and the local store
pub struct SyncEngine {
    remote: Arc<dyn IRemoteDataSource>,
    store: Arc<dyn IDataPointStore>,
    page_delay: Duration,
}

impl SyncEngine {
    /// Creates an engine with the page delay taken from configuration
    pub fn new(
        remote: Arc<dyn IRemoteDataSource>,
        store: Arc<dyn IDataPointStore>,
        config: &Config,
    ) -> Self {
        Self::with_page_delay(remote, store, Duration::from_secs(config.sync.page_delay_secs))
    }

    /// Creates an engine with an explicit inter-page delay
    pub fn with_page_delay(
        remote: Arc<dyn IRemoteDataSource>,
        store: Arc<dyn IDataPointStore>,
        page_delay: Duration,
    ) -> Self {
        Self {
            remote,
            store,
            page_delay,
        }
    }

    /// Runs one synchronization pass for a survey group
    ///
    /// Loops until the feed is exhausted, an error aborts the run, or
    /// `cancel` fires. Cancellation between pages is a clean stop, not an
    /// error: everything merged so far stays committed and the summary is
    /// returned with `cancelled` set.
    ///
    /// Each merged page is reported over `progress`; a dropped receiver
    /// does not stop the run.
    #[instrument(skip(self, progress, cancel), fields(group = %survey_group_id))]
    pub async fn run(
        &self,
        survey_group_id: SurveyGroupId,
        progress: mpsc::Sender<PageResult>,
        cancel: &CancellationToken,
    ) -> Result<SyncRunSummary, SyncError> {
        let mut summary = SyncRunSummary::default();
        // Ids merged from the previous page. The feed window is inclusive
        // at the watermark, so the boundary records come back on the next
        // page and must not be counted twice.
        let mut last_batch: HashSet<String> = HashSet::new();

        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                return Ok(summary);
            }

            let since = self
                .store
                .get_sync_time(survey_group_id)
                .await
                .map_err(SyncError::Store)?;

            let page = self
                .remote
                .fetch_page(survey_group_id, since.as_ref())
                .await?;

            let page_corrupt = page
                .data_points
                .iter()
                .any(|dp| dp.submissions.is_empty());
            if page_corrupt {
                summary.corruption_observed = true;
                warn!(
                    group = %survey_group_id,
                    "Fetched page carries records without submissions"
                );
            }

            let fresh: Vec<RemoteDataPoint> = page
                .data_points
                .into_iter()
                .filter(|dp| !last_batch.contains(dp.id.as_str()))
                .collect();

            if fresh.is_empty() {
                debug!(
                    group = %survey_group_id,
                    synced = summary.synced,
                    "Feed exhausted"
                );
                return Ok(summary);
            }

            let merged = self
                .store
                .merge_data_points(&fresh)
                .await
                .map_err(SyncError::Store)?;

            summary.synced += merged.len() as u64;
            last_batch = merged.into_iter().map(String::from).collect();

            debug!(
                group = %survey_group_id,
                page_size = last_batch.len(),
                synced = summary.synced,
                "Merged page"
            );

            let page_result = PageResult {
                merged_count: last_batch.len(),
                is_corrupt: page_corrupt,
            };
            // Progress is advisory; a dropped receiver must not stop a run
            let _ = progress.send(page_result).await;

            tokio::select! {
                _ = tokio::time::sleep(self.page_delay) => {}
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    return Ok(summary);
                }
            }
        }
    }
}
