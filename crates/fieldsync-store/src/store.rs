//! SQLite implementation of IDataPointStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! data point store port defined in fieldsync-core. It owns the mapping
//! between wire DTOs, stored rows and domain entities, and enforces the
//! transactional coupling between page merges and watermark advances.
//!
//! ## Type Mapping
//!
//! | Domain Type   | SQL Type | Strategy                                   |
//! |---------------|----------|--------------------------------------------|
//! | RecordId      | TEXT     | String via `.as_str()` / `RecordId::new()` |
//! | SurveyGroupId | INTEGER  | i64 via `.as_i64()`                        |
//! | SyncTime      | TEXT     | String via `.as_str()` / `SyncTime::new()`; ordered with CAST for the monotonic guard |
//! | Coordinates   | REAL x2  | Nullable pair, both present or both NULL   |
//! | status        | INTEGER  | `MIN(submissions.status)` at query time    |

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::{broadcast, mpsc};

use fieldsync_core::domain::newtypes::{RecordId, SurveyGroupId, SyncTime};
use fieldsync_core::domain::{Coordinates, DataPoint};
use fieldsync_core::ports::{DataPointFilter, IDataPointStore, OrderBy, RemoteDataPoint};

use crate::{ChangeNotifier, StoreError};

/// Buffer size of a watch subscription channel
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// SQLite-based implementation of the data point store port
///
/// All operations run through a connection pool; a page merge uses a single
/// transaction so the row upserts and the watermark advance commit together.
pub struct SqliteDataPointStore {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl SqliteDataPointStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Returns the change notifier shared by this store's subscriptions
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Reconstruct a DataPoint from a query row
///
/// The row must carry the aggregated `status` column produced by
/// [`build_query_sql`].
fn data_point_from_row(row: &SqliteRow) -> Result<DataPoint, StoreError> {
    let id_str: String = row.get("record_id");
    let survey_group_id: i64 = row.get("survey_group_id");
    let display_name: String = row.get("display_name");
    let latitude: Option<f64> = row.get("latitude");
    let longitude: Option<f64> = row.get("longitude");
    let last_modified: i64 = row.get("last_modified");
    let status: i32 = row.get("status");

    let id = RecordId::new(id_str).map_err(|e| StoreError::InvalidRow(e.to_string()))?;
    let coordinates = Coordinates::from_pair(latitude, longitude)
        .map_err(|e| StoreError::InvalidRow(e.to_string()))?;

    Ok(DataPoint {
        id,
        survey_group_id: SurveyGroupId::new(survey_group_id),
        name: display_name,
        coordinates,
        last_modified,
        status,
    })
}

/// Assemble the data point query for a filter
///
/// The aggregated status is the minimum submission status per record, so a
/// record with no submissions reports 0. Distance ordering ranks by squared
/// planar error with the longitude term scaled by cos²(latitude) to
/// approximate great-circle shortening; records without a position sort
/// last. Coordinates are interpolated rather than bound because they feed an
/// ORDER BY expression, and they are plain f64 values.
fn build_query_sql(filter: &DataPointFilter) -> String {
    let mut sql = String::from(
        "SELECT dp.record_id, dp.survey_group_id, dp.display_name, \
         dp.latitude, dp.longitude, dp.last_modified, \
         COALESCE(MIN(s.status), 0) AS status \
         FROM data_points dp \
         LEFT JOIN submissions s ON s.record_id = dp.record_id \
         WHERE dp.survey_group_id = ?1",
    );

    if filter.name_contains.is_some() {
        sql.push_str(" AND dp.display_name LIKE '%' || ?2 || '%'");
    }

    sql.push_str(" GROUP BY dp.record_id");

    match filter.order_by {
        OrderBy::Name => {
            sql.push_str(" ORDER BY dp.display_name COLLATE NOCASE ASC");
        }
        OrderBy::Date => {
            sql.push_str(" ORDER BY dp.last_modified DESC");
        }
        OrderBy::Status => {
            sql.push_str(" ORDER BY status ASC, dp.display_name COLLATE NOCASE ASC");
        }
        OrderBy::Distance {
            latitude,
            longitude,
        } => {
            let fudge = latitude.to_radians().cos().powi(2);
            sql.push_str(&format!(
                " ORDER BY CASE WHEN dp.latitude IS NULL THEN 1 ELSE 0 END, \
                 ((dp.latitude - {latitude}) * (dp.latitude - {latitude}) + \
                 (dp.longitude - {longitude}) * (dp.longitude - {longitude}) * {fudge})"
            ));
        }
    }

    sql
}

/// Run a data point query once
async fn run_query(
    pool: &SqlitePool,
    survey_group_id: SurveyGroupId,
    filter: &DataPointFilter,
) -> Result<Vec<DataPoint>, StoreError> {
    let sql = build_query_sql(filter);
    let mut query = sqlx::query(&sql).bind(survey_group_id.as_i64());
    if let Some(needle) = &filter.name_contains {
        query = query.bind(needle);
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(data_point_from_row).collect()
}

// ============================================================================
// IDataPointStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IDataPointStore for SqliteDataPointStore {
    #[tracing::instrument(skip(self, data_points), fields(count = data_points.len()))]
    async fn merge_data_points(
        &self,
        data_points: &[RemoteDataPoint],
    ) -> anyhow::Result<Vec<RecordId>> {
        if data_points.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;
        let mut merged = Vec::with_capacity(data_points.len());
        let mut group_watermarks: HashMap<i64, i64> = HashMap::new();

        for dp in data_points {
            let id = RecordId::new(dp.id.clone())
                .map_err(|e| StoreError::InvalidRow(e.to_string()))?;
            Coordinates::from_pair(dp.latitude, dp.longitude)
                .map_err(|e| StoreError::InvalidRow(e.to_string()))?;

            // A record's last_modified never regresses; a stale page leaves
            // the newer timestamp in place.
            sqlx::query(
                "INSERT INTO data_points \
                 (record_id, survey_group_id, display_name, latitude, longitude, last_modified) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(record_id) DO UPDATE SET \
                 survey_group_id = excluded.survey_group_id, \
                 display_name = excluded.display_name, \
                 latitude = excluded.latitude, \
                 longitude = excluded.longitude, \
                 last_modified = MAX(data_points.last_modified, excluded.last_modified)",
            )
            .bind(id.as_str())
            .bind(dp.survey_group_id)
            .bind(&dp.display_name)
            .bind(dp.latitude)
            .bind(dp.longitude)
            .bind(dp.last_modified)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            for sub in &dp.submissions {
                sqlx::query(
                    "INSERT OR REPLACE INTO submissions \
                     (uuid, record_id, form_id, collection_date, submitter, status) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(&sub.uuid)
                .bind(id.as_str())
                .bind(&sub.form_id)
                .bind(sub.collection_date)
                .bind(&sub.submitter)
                .bind(sub.status)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from)?;
            }

            let entry = group_watermarks
                .entry(dp.survey_group_id)
                .or_insert(dp.last_modified);
            if dp.last_modified > *entry {
                *entry = dp.last_modified;
            }

            merged.push(id);
        }

        // Watermark advance is part of the page transaction and is monotonic:
        // the stored token only moves forward.
        for (group_id, max_modified) in group_watermarks {
            sqlx::query(
                "INSERT INTO sync_time (survey_group_id, time) VALUES (?1, ?2) \
                 ON CONFLICT(survey_group_id) DO UPDATE SET time = excluded.time \
                 WHERE CAST(sync_time.time AS INTEGER) < CAST(excluded.time AS INTEGER)",
            )
            .bind(group_id)
            .bind(max_modified.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;
        }

        tx.commit().await.map_err(StoreError::from)?;
        self.notifier.notify();

        tracing::trace!(merged = merged.len(), "Page merged into store");
        Ok(merged)
    }

    async fn get_sync_time(
        &self,
        survey_group_id: SurveyGroupId,
    ) -> anyhow::Result<Option<SyncTime>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT time FROM sync_time WHERE survey_group_id = ?1")
                .bind(survey_group_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from)?;

        match row {
            Some((time,)) => {
                let token =
                    SyncTime::new(time).map_err(|e| StoreError::InvalidRow(e.to_string()))?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    async fn query_data_points(
        &self,
        survey_group_id: SurveyGroupId,
        filter: &DataPointFilter,
    ) -> anyhow::Result<Vec<DataPoint>> {
        let data_points = run_query(&self.pool, survey_group_id, filter).await?;
        Ok(data_points)
    }

    async fn watch_data_points(
        &self,
        survey_group_id: SurveyGroupId,
        filter: &DataPointFilter,
    ) -> anyhow::Result<mpsc::Receiver<Vec<DataPoint>>> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let pool = self.pool.clone();
        let filter = filter.clone();
        let mut changes = self.notifier.subscribe();

        tokio::spawn(async move {
            loop {
                let snapshot = match run_query(&pool, survey_group_id, &filter).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(error = %e, "Watch query failed; ending subscription");
                        break;
                    }
                };

                if tx.send(snapshot).await.is_err() {
                    break;
                }

                tokio::select! {
                    changed = changes.recv() => match changed {
                        Ok(()) => {}
                        // Lagging only means we coalesce several writes into
                        // one resnapshot
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = tx.closed() => break,
                }
            }

            tracing::trace!(group = survey_group_id.as_i64(), "Watch subscription ended");
        });

        Ok(rx)
    }

    #[tracing::instrument(skip(self))]
    async fn remove_orphans(&self) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "DELETE FROM data_points WHERE record_id NOT IN \
             (SELECT DISTINCT record_id FROM submissions)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.notifier.notify();
            tracing::debug!(removed, "Removed orphan records");
        }

        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================
