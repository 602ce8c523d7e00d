//! Remote data source port (driven/secondary port)
//!
//! This module defines the interface for fetching data point pages from the
//! survey-data server. The primary implementation targets the production
//! REST endpoint, but the trait is transport-agnostic.
//!
//! ## Design Notes
//!
//! - Unlike the store port, this port returns a typed [`RemoteError`]
//!   because the sync engine must branch on the failure class: a `Forbidden`
//!   response means the device lacks an assignment for the survey group and
//!   is surfaced to the operator differently from a transport failure.
//! - The `RemoteDataPoint` struct is a port-level DTO, not a domain entity;
//!   the store adapter is responsible for mapping it into persisted rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::newtypes::{SurveyGroupId, SyncTime};

// ============================================================================
// Error classification
// ============================================================================

/// Classified failure from a page fetch
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server rejected the request with HTTP 403: this device is not
    /// assigned to the requested survey group
    #[error("Device is not assigned to survey group {0}")]
    Forbidden(SurveyGroupId),

    /// IO/transport failure (DNS, connect, timeout, interrupted body)
    #[error("Network error: {0}")]
    Network(String),

    /// Any other unexpected server response
    #[error("Unexpected API response ({status}): {message}")]
    UnexpectedStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body or status text, for diagnostics
        message: String,
    },
}

// ============================================================================
// Page DTOs
// ============================================================================

/// A single data point as delivered by the server
///
/// Raw wire-shaped data; optional fields reflect what the server may omit.
/// Coordinates may be absent as a pair; `status` defaults to 0 when the
/// server omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDataPoint {
    /// Stable natural key for the record
    pub id: String,
    /// Owning survey group
    pub survey_group_id: i64,
    /// Human-readable label
    pub display_name: String,
    /// Latitude, if a position was captured
    pub latitude: Option<f64>,
    /// Longitude, if a position was captured
    pub longitude: Option<f64>,
    /// Last server-side modification time (epoch milliseconds)
    pub last_modified: i64,
    /// Submissions collected against this record, delivered inline
    ///
    /// An empty list here marks the record as corrupt on the server side;
    /// the engine records the observation and the orphan sweep removes the
    /// row if it ever lands without submissions.
    pub submissions: Vec<RemoteSubmission>,
}

/// A submission (collected form instance) as delivered by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSubmission {
    /// Globally unique submission identifier
    pub uuid: String,
    /// Form this submission answers
    pub form_id: String,
    /// Collection timestamp (epoch milliseconds)
    pub collection_date: i64,
    /// Device or enumerator name; may be empty
    pub submitter: String,
    /// Submission lifecycle status (0 when the server omits it)
    pub status: i32,
}

/// One page of the paginated data point feed
#[derive(Debug, Clone)]
pub struct DataPointPage {
    /// Data points newer than the requested watermark, in server order
    pub data_points: Vec<RemoteDataPoint>,
    /// Server-reported total count for the group
    pub result_count: i64,
}

// ============================================================================
// IRemoteDataSource trait
// ============================================================================

/// Port trait for the survey-data server's paging feed
///
/// ## Implementation Notes
///
/// - One call fetches exactly one page; the engine guarantees it never has
///   more than one fetch in flight per run.
/// - `since = None` requests a full feed from epoch (first sync for the
///   group).
/// - Implementations must not retry internally; retry policy belongs to the
///   caller (a fresh sync run resumes from the committed watermark).
#[async_trait::async_trait]
pub trait IRemoteDataSource: Send + Sync {
    /// Fetches one page of data points for a survey group
    ///
    /// # Arguments
    /// * `survey_group_id` - The group to fetch for
    /// * `since` - Watermark lower bound (None for a full sync from epoch)
    ///
    /// # Returns
    /// A page of data points plus the server-reported total count
    async fn fetch_page(
        &self,
        survey_group_id: SurveyGroupId,
        since: Option<&SyncTime>,
    ) -> Result<DataPointPage, RemoteError>;
}
