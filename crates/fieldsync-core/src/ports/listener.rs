//! Sync listener port (driven/secondary port)
//!
//! This module defines the interface through which a sync run reports its
//! lifecycle to external collaborators (UI, notification tray, logs). The
//! orchestrator emits an ordered event sequence per run plus a parameterless
//! "data changed" broadcast that UI collaborators use to refresh themselves.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because delivery is adapter-specific.
//! - Events are fire-and-forget; a listener failure is logged by the
//!   orchestrator but never aborts a run.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::SurveyGroupId;

// ============================================================================
// SyncEvent enum
// ============================================================================

/// Lifecycle event of one sync run
///
/// Per run, listeners observe `Started`, zero or more `Progress` events
/// (one per merged page), and exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SyncEvent {
    /// The run has begun
    Started,
    /// A page was merged; `synced` is the accumulated record count so far
    Progress {
        /// Records merged since the run started
        synced: u64,
    },
    /// Terminal: the run completed and every fetched record was well-formed
    CompletedOk {
        /// Total records merged by the run
        synced: u64,
    },
    /// Terminal: the run completed but at least one record arrived without
    /// submissions (server-side data corruption)
    CompletedCorrupt {
        /// Total records merged by the run
        synced: u64,
    },
    /// Terminal: the server refused the fetch because this device holds no
    /// assignment for the survey group
    AssignmentRequired {
        /// Operator-facing remediation hint
        message: String,
    },
    /// Terminal: the run aborted on a transport or API failure
    Failed {
        /// Failure description
        message: String,
    },
}

impl SyncEvent {
    /// Returns true if this event ends the run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncEvent::Started | SyncEvent::Progress { .. })
    }
}

// ============================================================================
// ISyncListener trait
// ============================================================================

/// Port trait for observing sync run lifecycles
///
/// ## Implementation Notes
///
/// - `on_event` delivers the per-run event sequence described on
///   [`SyncEvent`].
/// - `on_data_changed` fires after every run regardless of outcome,
///   including failed runs: pages merged before an abort are committed, so
///   consumers must refresh either way.
#[async_trait::async_trait]
pub trait ISyncListener: Send + Sync {
    /// Delivers one lifecycle event for a survey group's run
    async fn on_event(
        &self,
        survey_group_id: SurveyGroupId,
        event: SyncEvent,
    ) -> anyhow::Result<()>;

    /// Signals that stored data may have changed (parameterless broadcast)
    async fn on_data_changed(&self) -> anyhow::Result<()>;
}
