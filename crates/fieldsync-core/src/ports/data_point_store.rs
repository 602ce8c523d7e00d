//! Data point store port (driven/secondary port)
//!
//! This module defines the interface for the local, offline-capable record
//! store: transactional merges of fetched pages, the per-survey-group sync
//! watermark, the orphan-record sweep, and reactive queries for UI lists
//! and maps.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite today) and don't need domain-level classification.
//! - `watch` delivers full resnapshots: subscribers receive the complete
//!   current result set on every relevant write, not incremental diffs.
//! - `merge_data_points` takes the port-level DTOs straight off the wire;
//!   the adapter owns the mapping into persisted rows.

use tokio::sync::mpsc;

use crate::domain::newtypes::{RecordId, SurveyGroupId, SyncTime};
use crate::domain::DataPoint;

use super::remote_data_source::RemoteDataPoint;

// ============================================================================
// DataPointFilter struct
// ============================================================================

/// Ordering applied to a data point query
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OrderBy {
    /// By display name, case-insensitive
    #[default]
    Name,
    /// By last-modified time, newest first
    Date,
    /// By aggregated submission status, lowest (worst) first
    Status,
    /// By approximate planar distance from a reference point; records
    /// without coordinates sort last
    Distance {
        /// Reference latitude
        latitude: f64,
        /// Reference longitude
        longitude: f64,
    },
}

/// Filter criteria for querying data points
///
/// # Example
///
/// ```
/// use fieldsync_core::ports::{DataPointFilter, OrderBy};
///
/// // Nearest records to the device's current position
/// let filter = DataPointFilter::new().with_order_by(OrderBy::Distance {
///     latitude: 41.98,
///     longitude: 2.82,
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataPointFilter {
    /// Ordering of the result set
    pub order_by: OrderBy,
    /// Case-insensitive substring match on the display name
    pub name_contains: Option<String>,
}

impl DataPointFilter {
    /// Creates a new filter with the default ordering (by name)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result ordering
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Sets the name substring filter
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }
}

// ============================================================================
// IDataPointStore trait
// ============================================================================

/// Port trait for the reactive local record store
///
/// ## Implementation Notes
///
/// - `merge_data_points` must be transactional: the row upserts and the
///   watermark advance for a page either all commit or none do. The
///   watermark never moves backwards, even when a page carries an older
///   `last_modified` than already recorded.
/// - Upserts are keyed by the record's natural id; re-merging the same
///   record updates fields in place rather than duplicating rows.
/// - `remove_orphans` is a consistency sweep, not an error path; callers
///   run it after every sync pass.
#[async_trait::async_trait]
pub trait IDataPointStore: Send + Sync {
    /// Merges one page of fetched data points into the store
    ///
    /// Inserts or updates each record (and its inline submissions) by
    /// natural id, and advances the group's watermark to the maximum
    /// `last_modified` observed in the call, all within one transaction.
    ///
    /// # Returns
    /// The ids of the merged records, in page order
    async fn merge_data_points(
        &self,
        data_points: &[RemoteDataPoint],
    ) -> anyhow::Result<Vec<RecordId>>;

    /// Returns the current sync watermark for a survey group
    ///
    /// `None` means the group has never completed a page merge; the next
    /// fetch is a full sync from epoch.
    async fn get_sync_time(&self, survey_group_id: SurveyGroupId)
        -> anyhow::Result<Option<SyncTime>>;

    /// Queries data points matching the given filter, once
    async fn query_data_points(
        &self,
        survey_group_id: SurveyGroupId,
        filter: &DataPointFilter,
    ) -> anyhow::Result<Vec<DataPoint>>;

    /// Subscribes to a reactive data point query
    ///
    /// The returned channel yields the current matching set immediately,
    /// then re-yields the full recomputed set after every write that
    /// touches the underlying tables. The subscription ends when the
    /// receiver is dropped.
    async fn watch_data_points(
        &self,
        survey_group_id: SurveyGroupId,
        filter: &DataPointFilter,
    ) -> anyhow::Result<mpsc::Receiver<Vec<DataPoint>>>;

    /// Deletes every stored record that has zero associated submissions
    ///
    /// # Returns
    /// The number of records removed
    async fn remove_orphans(&self) -> anyhow::Result<u64>;
}
