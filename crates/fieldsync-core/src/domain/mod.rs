//! Domain model
//!
//! Entities and value types for the survey-data domain. Everything here is
//! IO-free; persistence and transport live behind the [`crate::ports`]
//! traits.

pub mod data_point;
pub mod errors;
pub mod newtypes;

pub use data_point::{Coordinates, DataPoint, Submission};
pub use errors::DomainError;
pub use newtypes::{RecordId, SurveyGroupId, SyncTime};
