//! Data point and submission entities
//!
//! A data point is a surveyed location/record owned by a survey group. Each
//! data point carries zero or more submissions (collected form instances);
//! a stored data point with zero submissions is an orphan and is eligible
//! for deletion during the post-sync consistency sweep.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{RecordId, SurveyGroupId};

/// A geographic position captured in the field
///
/// Latitude and longitude always travel together; a data point either has a
/// full position or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates
    ///
    /// # Errors
    /// Returns error if either value is outside its valid range
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "longitude out of range: {longitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build coordinates from an optional pair, enforcing both-or-neither
    ///
    /// # Errors
    /// Returns error if exactly one of the pair is present or a value is
    /// out of range
    pub fn from_pair(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, DomainError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Ok(Some(Self::new(lat, lon)?)),
            (None, None) => Ok(None),
            _ => Err(DomainError::InvalidCoordinates(
                "latitude and longitude must both be present or both absent".to_string(),
            )),
        }
    }
}

/// A collected form instance attached to a data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Globally unique submission identifier
    pub uuid: String,
    /// Form this submission answers
    pub form_id: String,
    /// When the submission was collected (epoch milliseconds)
    pub collection_date: i64,
    /// Device or enumerator that collected it; may be empty
    pub submitter: String,
    /// Submission lifecycle status; 0 when the server omits it
    pub status: i32,
}

/// A surveyed location/record tracked by the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Stable natural key assigned by the server
    pub id: RecordId,
    /// Owning survey group
    pub survey_group_id: SurveyGroupId,
    /// Human-readable label
    pub name: String,
    /// Position, when one was captured
    pub coordinates: Option<Coordinates>,
    /// Last server or local write time (epoch milliseconds)
    pub last_modified: i64,
    /// Displayed status: the minimum status across this record's submissions
    pub status: i32,
}

impl DataPoint {
    /// Displayed status for a set of submissions: the minimum wins, so the
    /// "worst/earliest" lifecycle state drives display ordering
    #[must_use]
    pub fn aggregate_status(submissions: &[Submission]) -> i32 {
        submissions.iter().map(|s| s.status).min().unwrap_or(0)
    }
}
