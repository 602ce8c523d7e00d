//! fieldsync-engine - Incremental synchronization engine
//!
//! Provides:
//! - Watermark-based page polling against the survey server
//! - Cross-page duplicate suppression
//! - Transactional merge into the local store
//! - Run lifecycle orchestration and notification fan-out
//!
//! ## Modules
//!
//! - [`engine`] - The fetch→dedup→merge poll loop for one survey group
//! - [`orchestrator`] - Run lifecycle wrapper: per-group serialization,
//!   progress events, error mapping, post-run consistency sweep

pub mod engine;
pub mod orchestrator;

use thiserror::Error;

use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::RemoteError;

/// Errors that can abort a synchronization run
///
/// Every variant is terminal for the current run and none is retried
/// automatically; the watermark stays at its last committed value, so a
/// fresh run resumes where this one stopped.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The device holds no assignment for the survey group; requires a
    /// server-side fix, not a retry
    #[error("Device is not assigned to survey group {0}")]
    AssignmentRequired(SurveyGroupId),

    /// IO/transport failure mid-page
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The server answered with something other than a page
    #[error("API failure: {0}")]
    Api(String),

    /// The local store rejected a merge or lookup
    #[error("Store failure: {0}")]
    Store(#[source] anyhow::Error),

    /// The run infrastructure itself failed (e.g. a panicked task)
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Forbidden(group) => SyncError::AssignmentRequired(group),
            RemoteError::Network(msg) => SyncError::Transport(msg),
            RemoteError::UnexpectedStatus { status, message } => {
                SyncError::Api(format!("status {status}: {message}"))
            }
        }
    }
}
